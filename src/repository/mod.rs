pub mod gcloud;
pub mod ssh;
