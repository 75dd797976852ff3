use crate::value_objects::depth::DepthSnapshot;

pub trait OrderBookSource {
    fn fetch_depth(&self, symbol: &str, limit: usize) -> Result<DepthSnapshot, String>;
}
