use crate::value_objects::epoch_record::EpochRecord;

pub trait TrainingLogRepository {
    fn last_epoch(&self) -> Result<Option<u64>, String>;
    fn insert_epoch(&self, record: &EpochRecord) -> Result<(), String>;
}
