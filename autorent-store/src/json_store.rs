use async_trait::async_trait;
use autorent_core::{Booking, Car, CoreResult, ImageOverrides, NewBooking, RentalRepository};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::seed::{seed_cars, seed_image};
use crate::StoreError;

/// The whole persisted state, written as one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub cars: Vec<Car>,
    pub bookings: Vec<Booking>,
    pub images: ImageOverrides,
}

impl Document {
    fn seeded() -> Self {
        Self {
            cars: seed_cars(),
            ..Self::default()
        }
    }

    /// Seeds an empty fleet and re-applies overrides so every car shows its
    /// current image.
    fn prepare(&mut self) {
        if self.cars.is_empty() {
            self.cars = seed_cars();
            info!("Seeded {} cars", self.cars.len());
        }
        self.cars.sort_by_key(|c| c.id);
        for car in &mut self.cars {
            if let Some(image) = self.images.get(&car.id) {
                car.image = image.clone();
            }
        }
    }

    fn car_mut(&mut self, id: i64) -> Option<&mut Car> {
        self.cars.iter_mut().find(|c| c.id == id)
    }

    fn next_booking_id(&self) -> i64 {
        self.bookings.iter().map(|b| b.id).max().map_or(1, |max| max + 1)
    }
}

#[derive(Debug)]
enum Backend {
    File(PathBuf),
    Volatile,
}

#[derive(Debug)]
struct Inner {
    doc: Document,
    backend: Backend,
}

impl Inner {
    /// Writes the document after a mutation. A failed write leaves the old
    /// file untouched and drops the store to memory-only mode.
    ///
    /// The file work runs on the blocking pool; the caller keeps the write
    /// lock until it finishes, so writes land in mutation order.
    async fn persist(&mut self) {
        let Backend::File(path) = &self.backend else {
            return;
        };
        let path = path.clone();

        let result = match serde_json::to_vec_pretty(&self.doc) {
            Ok(content) => {
                let target = path.clone();
                tokio::task::spawn_blocking(move || write_bytes(&target, &content))
                    .await
                    .unwrap_or_else(|e| Err(io::Error::other(e)))
            }
            Err(e) => Err(e.into()),
        };

        if let Err(e) = result {
            error!(
                "Failed to write {}; continuing with in-memory store: {}",
                path.display(),
                e
            );
            self.backend = Backend::Volatile;
        }
    }
}

/// Car, booking and image-override store backed by a single JSON file.
///
/// All mutations take the write lock, so read-modify-write cycles never
/// interleave.
#[derive(Debug)]
pub struct JsonStore {
    inner: RwLock<Inner>,
}

impl JsonStore {
    /// Loads `path` (seeding it when absent or empty) and writes the
    /// initialized document back before returning.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let init_err = |source: io::Error| StoreError::Init {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(parent_dir(&path)).map_err(init_err)?;

        let mut doc = read_document(&path)?;
        doc.prepare();
        write_document(&path, &doc).map_err(init_err)?;

        info!(
            "Store loaded from {} ({} cars, {} bookings, {} image overrides)",
            path.display(),
            doc.cars.len(),
            doc.bookings.len(),
            doc.images.len()
        );

        Ok(Self {
            inner: RwLock::new(Inner {
                doc,
                backend: Backend::File(path),
            }),
        })
    }

    /// Seeded store that never touches the disk.
    pub fn volatile() -> Self {
        Self {
            inner: RwLock::new(Inner {
                doc: Document::seeded(),
                backend: Backend::Volatile,
            }),
        }
    }

    pub fn open_or_volatile(path: impl Into<PathBuf>) -> Self {
        match Self::open(path) {
            Ok(store) => store,
            Err(e) => {
                error!("Store init failed, falling back to in-memory store: {}", e);
                Self::volatile()
            }
        }
    }

    pub async fn is_persistent(&self) -> bool {
        matches!(self.inner.read().await.backend, Backend::File(_))
    }

    pub async fn snapshot(&self) -> Document {
        self.inner.read().await.doc.clone()
    }

    /// Copies the on-disk document to `<file>.bak`.
    pub async fn backup(&self) -> Result<PathBuf, StoreError> {
        let inner = self.inner.read().await;
        let Backend::File(path) = &inner.backend else {
            return Err(StoreError::Volatile);
        };
        if !path.exists() {
            return Err(StoreError::Missing(path.clone()));
        }

        let mut bak = path.as_os_str().to_owned();
        bak.push(".bak");
        let bak = PathBuf::from(bak);
        fs::copy(path, &bak)?;
        info!("Backed up {} to {}", path.display(), bak.display());
        Ok(bak)
    }
}

#[async_trait]
impl RentalRepository for JsonStore {
    async fn list_cars(&self) -> CoreResult<Vec<Car>> {
        let mut cars = self.inner.read().await.doc.cars.clone();
        cars.sort_by_key(|c| c.id);
        Ok(cars)
    }

    async fn get_car(&self, id: i64) -> CoreResult<Option<Car>> {
        let inner = self.inner.read().await;
        Ok(inner.doc.cars.iter().find(|c| c.id == id).cloned())
    }

    async fn set_car_image(&self, id: i64, image: &str) -> CoreResult<Option<Car>> {
        let mut inner = self.inner.write().await;
        let Some(car) = inner.doc.car_mut(id) else {
            return Ok(None);
        };
        car.image = image.to_string();
        let updated = car.clone();
        inner.doc.images.insert(id, image.to_string());
        inner.persist().await;
        Ok(Some(updated))
    }

    async fn reset_car_image(&self, id: i64) -> CoreResult<Option<Car>> {
        let mut inner = self.inner.write().await;
        let Some(car) = inner.doc.car_mut(id) else {
            return Ok(None);
        };
        car.image = seed_image(id);
        let updated = car.clone();
        inner.doc.images.remove(&id);
        inner.persist().await;
        Ok(Some(updated))
    }

    async fn reset_all_images(&self) -> CoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.doc.images.clear();
        for car in &mut inner.doc.cars {
            car.image = seed_image(car.id);
        }
        inner.persist().await;
        Ok(())
    }

    async fn images(&self) -> CoreResult<ImageOverrides> {
        Ok(self.inner.read().await.doc.images.clone())
    }

    async fn list_bookings(&self) -> CoreResult<Vec<Booking>> {
        let mut bookings = self.inner.read().await.doc.bookings.clone();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(bookings)
    }

    async fn create_booking(&self, booking: NewBooking) -> CoreResult<Booking> {
        let mut inner = self.inner.write().await;
        let row = Booking {
            id: inner.doc.next_booking_id(),
            car_id: booking.car_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            customer: booking.customer,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        inner.doc.bookings.push(row.clone());
        inner.persist().await;
        Ok(row)
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

fn read_document(path: &Path) -> Result<Document, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Document::default()),
        Err(e) => {
            return Err(StoreError::Init {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    if content.trim().is_empty() {
        warn!("Store file {} is empty, starting fresh", path.display());
        return Ok(Document::default());
    }

    serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Temp file in the same directory, fsync, then rename over the target.
fn write_document(path: &Path, doc: &Document) -> io::Result<()> {
    write_bytes(path, &serde_json::to_vec_pretty(doc)?)
}

fn write_bytes(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(parent_dir(path))?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use autorent_core::{Customer, PLACEHOLDER_IMAGE};
    use chrono::{TimeZone, Utc};

    fn new_booking(car_id: i64, start: u32, end: u32) -> NewBooking {
        NewBooking {
            car_id,
            start_date: Utc.with_ymd_and_hms(2024, 1, start, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 1, end, 0, 0, 0).unwrap(),
            customer: Customer {
                name: "A".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_open_seeds_and_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server").join("db.json");

        let store = JsonStore::open(&path).unwrap();
        assert!(store.is_persistent().await);

        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            on_disk["cars"].as_array().unwrap().len(),
            seed_cars().len()
        );
        assert!(on_disk["bookings"].as_array().unwrap().is_empty());
        assert!(on_disk["images"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_file_is_seeded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "").unwrap();

        let store = JsonStore::open(&path).unwrap();
        assert_eq!(store.list_cars().await.unwrap().len(), seed_cars().len());
    }

    #[tokio::test]
    async fn test_reload_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let store = JsonStore::open(&path).unwrap();
        store.set_car_image(2, "https://cdn.example.com/creta.png").await.unwrap();
        store.create_booking(new_booking(1, 1, 5)).await.unwrap();
        store.create_booking(new_booking(3, 2, 3)).await.unwrap();
        let before = store.snapshot().await;
        drop(store);

        let reloaded = JsonStore::open(&path).unwrap();
        assert_eq!(reloaded.snapshot().await, before);
        assert_eq!(
            reloaded.get_car(2).await.unwrap().unwrap().image,
            "https://cdn.example.com/creta.png"
        );
    }

    #[tokio::test]
    async fn test_overrides_are_reapplied_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let mut doc = Document::seeded();
        doc.images.insert(4, "/cars/city-new.svg".to_string());
        fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

        let store = JsonStore::open(&path).unwrap();
        assert_eq!(store.get_car(4).await.unwrap().unwrap().image, "/cars/city-new.svg");
    }

    #[tokio::test]
    async fn test_corrupt_document_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "{ not json").unwrap();

        match JsonStore::open(&path) {
            Err(StoreError::Corrupt { .. }) => {}
            other => panic!("expected corrupt error, got {:?}", other.map(|_| ())),
        }
        // The bad file is left as it was.
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn test_unwritable_location_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let path = blocker.join("db.json");

        assert!(matches!(JsonStore::open(&path), Err(StoreError::Init { .. })));

        let store = JsonStore::open_or_volatile(&path);
        assert!(!store.is_persistent().await);
        assert_eq!(store.list_cars().await.unwrap().len(), seed_cars().len());

        let booking = store.create_booking(new_booking(1, 1, 2)).await.unwrap();
        assert_eq!(booking.id, 1);
        assert!(matches!(store.backup().await, Err(StoreError::Volatile)));
    }

    #[tokio::test]
    async fn test_write_failure_degrades_without_losing_the_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let path = data_dir.join("db.json");
        let store = JsonStore::open(&path).unwrap();

        fs::remove_dir_all(&data_dir).unwrap();

        let car = store.set_car_image(1, "/cars/swift-red.svg").await.unwrap().unwrap();
        assert_eq!(car.image, "/cars/swift-red.svg");
        assert!(!store.is_persistent().await);
        assert_eq!(store.get_car(1).await.unwrap().unwrap().image, "/cars/swift-red.svg");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_all_reach_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = std::sync::Arc::new(JsonStore::open(&path).unwrap());

        let writes = (1..=8).map(|id| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .set_car_image(id, &format!("/cars/override-{}.svg", id))
                    .await
                    .unwrap()
            })
        });
        for write in futures_util::future::join_all(writes).await {
            assert!(write.unwrap().is_some());
        }
        assert!(store.is_persistent().await);

        let reloaded = JsonStore::open(&path).unwrap();
        let images = reloaded.images().await.unwrap();
        assert_eq!(images.len(), 8);
        assert_eq!(images.get(&8).unwrap(), "/cars/override-8.svg");
        assert_eq!(reloaded.snapshot().await, store.snapshot().await);
    }

    #[tokio::test]
    async fn test_cars_are_listed_by_ascending_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let mut doc = Document::seeded();
        doc.cars.reverse();
        fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

        let store = JsonStore::open(&path).unwrap();
        let ids: Vec<i64> = store.list_cars().await.unwrap().iter().map(|c| c.id).collect();
        assert!(ids.windows(2).all(|w| w[0] <= w[1]));
        assert!(store.get_car(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_and_reset_car_image() {
        let store = JsonStore::volatile();

        let updated = store.set_car_image(1, "/cars/custom.png").await.unwrap().unwrap();
        assert_eq!(updated.image, "/cars/custom.png");
        assert_eq!(store.images().await.unwrap().get(&1).unwrap(), "/cars/custom.png");

        store.set_car_image(1, "/cars/other.png").await.unwrap();
        let reset = store.reset_car_image(1).await.unwrap().unwrap();
        assert_eq!(reset.image, seed_image(1));
        assert_eq!(store.get_car(1).await.unwrap().unwrap().image, seed_image(1));
        assert!(store.images().await.unwrap().is_empty());

        assert!(store.set_car_image(999, "/cars/x.svg").await.unwrap().is_none());
        assert!(store.reset_car_image(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_all_images() {
        let store = JsonStore::volatile();
        store.set_car_image(1, "/cars/a.svg").await.unwrap();
        store.set_car_image(7, "https://example.com/seltos.jpg").await.unwrap();

        store.reset_all_images().await.unwrap();

        assert!(store.images().await.unwrap().is_empty());
        for car in store.list_cars().await.unwrap() {
            assert_eq!(car.image, seed_image(car.id));
        }
        assert_eq!(store.get_car(7).await.unwrap().unwrap().image, PLACEHOLDER_IMAGE);
    }

    #[tokio::test]
    async fn test_booking_ids_increment_and_list_newest_first() {
        let store = JsonStore::volatile();
        let first = store.create_booking(new_booking(1, 1, 2)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = store.create_booking(new_booking(2, 1, 2)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.created_at >= first.created_at);

        let ids: Vec<i64> = store.list_bookings().await.unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_next_id_follows_the_highest_existing_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let mut doc = Document::seeded();
        doc.bookings.push(Booking {
            id: 41,
            car_id: 1,
            start_date: Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2023, 6, 2, 0, 0, 0).unwrap(),
            customer: Customer {
                name: "Old".to_string(),
            },
            created_at: 1_685_577_600_000,
        });
        fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

        let store = JsonStore::open(&path).unwrap();
        let booking = store.create_booking(new_booking(1, 1, 2)).await.unwrap();
        assert_eq!(booking.id, 42);
    }

    #[tokio::test]
    async fn test_backup_copies_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonStore::open(&path).unwrap();

        let bak = store.backup().await.unwrap();
        assert_eq!(bak, dir.path().join("db.json.bak"));
        assert_eq!(fs::read(&bak).unwrap(), fs::read(&path).unwrap());
    }
}
