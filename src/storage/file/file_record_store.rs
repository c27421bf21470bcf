use crate::common::election::MasterElectionRecord;
use crate::common::error::RecordStoreError;
use crate::common::health::HealthCheckRecord;
use crate::traits::record_store::UnsendRecordStore;
use std::io::{
    BufReader,
    ErrorKind::AlreadyExists,
    ErrorKind::NotFound,
    Seek,
    SeekFrom,
    Write,
};
use std::fs::{File, OpenOptions, create_dir_all, read_dir, remove_file};
use std::path::{Path, PathBuf};
use fs2::FileExt;

/// Record store backed by one JSON file per record. Create-if-absent maps
/// to `create_new`, version-guarded updates take an exclusive flock while
/// they compare and rewrite. Suitable for local runs and tests; the
/// production backends live next door.
pub struct FileRecordStore {
    election_dir_path: PathBuf,
    health_check_dir_path: PathBuf,
}

impl FileRecordStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            election_dir_path: data_dir.as_ref().join("master_election"),
            health_check_dir_path: data_dir.as_ref().join("health_check"),
        }
    }

    fn election_path(&self, scaling_group_id: &str) -> PathBuf {
        self.election_dir_path.join(format!("{scaling_group_id}.json"))
    }

    fn health_check_path(&self, instance_id: &str) -> PathBuf {
        self.health_check_dir_path.join(format!("{instance_id}.json"))
    }
}

impl UnsendRecordStore for FileRecordStore {
    async fn get_election_record(&self, scaling_group_id: &str) -> Result<Option<MasterElectionRecord>, RecordStoreError> {
        let path = self.election_path(scaling_group_id);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, MasterElectionRecord>(reader) {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.is_eof() => {
                log::warn!("Election record file is empty: {:?}", path);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_election_record(&self, record: &MasterElectionRecord) -> Result<(), RecordStoreError> {
        let path = self.election_path(&record.scaling_group_id);
        create_dir_all(&self.election_dir_path)?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == AlreadyExists => {
                return Err(RecordStoreError::Conflict {
                    key: record.scaling_group_id.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        log::debug!("Creating election record file: {:?}", path);
        let json = serde_json::to_string_pretty(record)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    async fn update_election_record(&self, record: &MasterElectionRecord) -> Result<(), RecordStoreError> {
        let path = self.election_path(&record.scaling_group_id);
        let mut file = match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(f) => f,
            // an update presumes the record exists; a vanished file means
            // the caller's read is stale
            Err(e) if e.kind() == NotFound => {
                return Err(RecordStoreError::Conflict {
                    key: record.scaling_group_id.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        file.lock_exclusive()?;
        file.seek(SeekFrom::Start(0))?;
        let reader = BufReader::new(&mut file);
        let current: MasterElectionRecord = match serde_json::from_reader(reader) {
            Ok(r) => r,
            Err(e) if e.is_eof() => {
                log::warn!("Election record file is empty: {:?}", path);
                return Err(RecordStoreError::Conflict {
                    key: record.scaling_group_id.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if current.version + 1 != record.version {
            log::debug!(
                "Election record version moved for {}: stored {}, incoming {}",
                record.scaling_group_id, current.version, record.version
            );
            return Err(RecordStoreError::Conflict {
                key: record.scaling_group_id.clone(),
            });
        }

        log::debug!("Saving updated election record to file: {:?}", path);
        let json = serde_json::to_string_pretty(record)?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    async fn get_health_check_record(&self, instance_id: &str) -> Result<Option<HealthCheckRecord>, RecordStoreError> {
        let path = self.health_check_path(instance_id);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, HealthCheckRecord>(reader) {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.is_eof() => {
                log::warn!("Health check record file is empty: {:?}", path);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn put_health_check_record(&self, record: &HealthCheckRecord) -> Result<(), RecordStoreError> {
        let path = self.health_check_path(&record.instance_id);
        create_dir_all(&self.health_check_dir_path)?;

        if record.version == 1 {
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(f) => f,
                Err(e) if e.kind() == AlreadyExists => {
                    return Err(RecordStoreError::Conflict {
                        key: record.instance_id.clone(),
                    });
                }
                Err(e) => return Err(e.into()),
            };
            log::debug!("Creating health check record file: {:?}", path);
            let json = serde_json::to_string_pretty(record)?;
            file.write_all(json.as_bytes())?;
            return Ok(());
        }

        let mut file = match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == NotFound => {
                return Err(RecordStoreError::Conflict {
                    key: record.instance_id.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        file.lock_exclusive()?;
        file.seek(SeekFrom::Start(0))?;
        let reader = BufReader::new(&mut file);
        let current: HealthCheckRecord = match serde_json::from_reader(reader) {
            Ok(r) => r,
            Err(e) if e.is_eof() => {
                log::warn!("Health check record file is empty: {:?}", path);
                return Err(RecordStoreError::Conflict {
                    key: record.instance_id.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if current.version + 1 != record.version {
            log::debug!(
                "Health check record version moved for {}: stored {}, incoming {}",
                record.instance_id, current.version, record.version
            );
            return Err(RecordStoreError::Conflict {
                key: record.instance_id.clone(),
            });
        }

        log::debug!("Saving updated health check record to file: {:?}", path);
        let json = serde_json::to_string_pretty(record)?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    async fn delete_health_check_record(&self, instance_id: &str) -> Result<(), RecordStoreError> {
        let path = self.health_check_path(instance_id);
        match remove_file(&path) {
            Ok(()) => {
                log::debug!("Deleted health check record file: {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == NotFound => Err(RecordStoreError::NotFound {
                key: instance_id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_election_records(&self) -> Result<Vec<MasterElectionRecord>, RecordStoreError> {
        let mut records = Vec::new();
        if !self.election_dir_path.exists() {
            return Ok(records);
        }

        for entry in read_dir(&self.election_dir_path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let file = File::open(entry.path())?;
                let reader = BufReader::new(file);
                let record: MasterElectionRecord = serde_json::from_reader(reader)?;
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn list_health_check_records(&self) -> Result<Vec<HealthCheckRecord>, RecordStoreError> {
        let mut records = Vec::new();
        if !self.health_check_dir_path.exists() {
            return Ok(records);
        }

        for entry in read_dir(&self.health_check_dir_path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let file = File::open(entry.path())?;
                let reader = BufReader::new(file);
                let record: HealthCheckRecord = serde_json::from_reader(reader)?;
                records.push(record);
            }
        }
        Ok(records)
    }
}
