pub mod file {
    pub mod file_record_store;
}
pub mod s3 {
    pub mod s3_client;
    pub mod s3_record_store;
}
pub mod redis {
    pub mod redis_client;
    pub mod redis_record_store;
}
pub mod record_store_impl;
