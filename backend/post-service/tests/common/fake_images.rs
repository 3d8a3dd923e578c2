//! In-memory ImageStore

use async_trait::async_trait;
use post_service::error::{AppError, Result};
use post_service::services::ImageStore;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeImageStore {
    stored: Mutex<BTreeMap<String, Vec<u8>>>,
    saves: AtomicUsize,
    deletes: Mutex<Vec<String>>,
    fail_saves: AtomicBool,
}

impl FakeImageStore {
    pub fn stored_names(&self) -> Vec<String> {
        self.stored.lock().unwrap().keys().cloned().collect()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn insert(&self, name: &str) {
        self.stored
            .lock()
            .unwrap()
            .insert(name.to_string(), b"existing".to_vec());
    }
}

#[async_trait]
impl ImageStore for FakeImageStore {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AppError::Storage(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        let n = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
        let name = format!("{n}-{original_name}");
        self.stored
            .lock()
            .unwrap()
            .insert(name.clone(), bytes.to_vec());
        Ok(name)
    }

    async fn delete(&self, stored_name: &str) -> Result<()> {
        self.deletes.lock().unwrap().push(stored_name.to_string());
        self.stored.lock().unwrap().remove(stored_name);
        Ok(())
    }
}
