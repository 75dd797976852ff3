pub mod action;
pub mod bar;
pub mod depth;
pub mod epoch_record;
pub mod observation;
