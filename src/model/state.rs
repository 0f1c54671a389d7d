use crate::config::Settings;
use crate::domain::catalogue::CatalogueStore;
use crate::domain::ssh_configuration::RusshConnector;
use crate::error::CatalogueError;
use crate::repository::gcloud::Gcloud;
use crate::repository::ssh::ExecOptions;

pub struct AppState {
    pub catalogue: CatalogueStore,
    pub connector: RusshConnector,
    pub options: ExecOptions,
    pub gcloud: Gcloud,
}

impl AppState {
    pub fn new(settings: &Settings) -> Result<Self, CatalogueError> {
        Ok(Self {
            catalogue: CatalogueStore::open(settings.catalogue_path.clone())?,
            connector: settings.connector(),
            options: settings.exec_options(),
            gcloud: Gcloud::new(settings.gcloud_bin.clone(), settings.vm_name_filter.clone()),
        })
    }
}
