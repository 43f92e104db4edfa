pub mod float_serde;
