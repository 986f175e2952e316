pub mod machine;
pub mod recorder;
