// src/testing.rs
// DOCUMENTATION: In-memory doubles for the capability traits
// PURPOSE: Exercise the backfill pipeline without network or database
//
// - MockPlaceProvider (PlaceProvider): HashMap-based pages/details/photos with call counters,
//   optional latency and in-flight tracking
// - MemoryDb (PlaceStore + LikeStore): one shared in-memory database
// - MemoryBucket (ObjectBucket): object map with a write counter
// - test_config(): Config with basic auth credentials hungry / s3cret
// - test_service_account_key(): service account key backed by testdata/*.pem

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use geo_types::Point;

use crate::config::Config;
use crate::db::{LikeStore, PlaceStore};
use crate::errors::PlacesError;
use crate::models::{NewPlace, Place};
use crate::services::{
    DetailField, NearbyPage, ObjectBucket, PlaceDetails, PlaceProvider, ServiceAccountKey,
};

/// Public half of the RSA key in test_service_account_key()
pub const TEST_SERVICE_ACCOUNT_PUBLIC_KEY: &str =
    include_str!("../testdata/service_account_pub.pem");

/// Service account key signed with a throwaway RSA key. The token endpoint is a
/// closed local port, so any token request fails fast.
pub fn test_service_account_key() -> ServiceAccountKey {
    ServiceAccountKey {
        client_email: "photos@hungries-test.iam.gserviceaccount.com".to_string(),
        private_key: include_str!("../testdata/service_account_key.pem").to_string(),
        token_uri: "http://127.0.0.1:9/token".to_string(),
    }
}

/// Configuration used by handler and config tests
pub fn test_config() -> Config {
    Config {
        database_url: "postgresql://localhost/hungries".to_string(),
        server_address: "127.0.0.1".to_string(),
        server_port: 8080,
        environment: "test".to_string(),
        log_level: "debug".to_string(),
        google_maps_api_key: "maps-key".to_string(),
        storage_bucket: "bucket".to_string(),
        storage_key_json: r#"{"client_email":"a@b","private_key":"k"}"#.to_string(),
        api_username: "hungry".to_string(),
        api_password: "s3cret".to_string(),
        db_max_connections: 5,
        db_connection_timeout: 5,
        backfill_concurrency: 4,
        http_timeout_secs: 5,
    }
}

// ---------------------------------------------------------------------------
// MockPlaceProvider
// ---------------------------------------------------------------------------

/// Provider returning registered responses. Unregistered details and photos fail.
pub struct MockPlaceProvider {
    pages: HashMap<String, NearbyPage>,
    details: HashMap<String, PlaceDetails>,
    photos: HashMap<String, Vec<u8>>,
    quota_exceeded: bool,
    delay: Option<Duration>,
    nearby_calls: AtomicUsize,
    detail_calls: Mutex<Vec<String>>,
    photo_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockPlaceProvider {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            details: HashMap::new(),
            photos: HashMap::new(),
            quota_exceeded: false,
            delay: None,
            nearby_calls: AtomicUsize::new(0),
            detail_calls: Mutex::new(Vec::new()),
            photo_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Register the page returned for `page_token` (None = first page)
    pub fn on_nearby(mut self, page_token: Option<&str>, place_ids: &[&str], next: Option<&str>) -> Self {
        self.pages.insert(
            page_token.unwrap_or_default().to_string(),
            NearbyPage {
                place_ids: place_ids.iter().map(|id| id.to_string()).collect(),
                next_page_token: next.map(str::to_string),
            },
        );
        self
    }

    pub fn on_details(mut self, place_id: &str, details: PlaceDetails) -> Self {
        self.details.insert(place_id.to_string(), details);
        self
    }

    pub fn on_photo(mut self, photo_reference: &str, data: Vec<u8>) -> Self {
        self.photos.insert(photo_reference.to_string(), data);
        self
    }

    /// Every nearby search fails with RateLimitExceeded
    pub fn quota_exceeded(mut self) -> Self {
        self.quota_exceeded = true;
        self
    }

    /// Every details call sleeps for `delay`, successful or not
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn nearby_calls(&self) -> usize {
        self.nearby_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }

    pub fn photo_calls(&self) -> usize {
        self.photo_calls.load(Ordering::SeqCst)
    }

    /// Highest number of details calls running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Total number of provider calls of any kind
    pub fn total_calls(&self) -> usize {
        self.nearby_calls() + self.detail_calls().len() + self.photo_calls()
    }
}

#[async_trait]
impl PlaceProvider for MockPlaceProvider {
    async fn nearby_search(
        &self,
        _origin: Point<f64>,
        _radius: u32,
        page_token: Option<&str>,
    ) -> Result<NearbyPage, PlacesError> {
        self.nearby_calls.fetch_add(1, Ordering::SeqCst);
        if self.quota_exceeded {
            return Err(PlacesError::RateLimitExceeded);
        }
        self.pages
            .get(page_token.unwrap_or_default())
            .cloned()
            .ok_or_else(|| PlacesError::ExternalApiError("MockPlaceProvider: no page".to_string()))
    }

    async fn place_details(
        &self,
        place_id: &str,
        _fields: &[DetailField],
    ) -> Result<PlaceDetails, PlacesError> {
        self.detail_calls.lock().unwrap().push(place_id.to_string());

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.details.get(place_id).cloned().ok_or_else(|| {
            PlacesError::ExternalApiError(format!("MockPlaceProvider: no details for {place_id}"))
        })
    }

    async fn photo(
        &self,
        photo_reference: &str,
        _max_width: u32,
        _max_height: u32,
    ) -> Result<Vec<u8>, PlacesError> {
        self.photo_calls.fetch_add(1, Ordering::SeqCst);
        self.photos.get(photo_reference).cloned().ok_or_else(|| {
            PlacesError::ExternalApiError(format!(
                "MockPlaceProvider: no photo for {photo_reference}"
            ))
        })
    }
}

/// Details fixture without photos
pub fn details(name: &str, latitude: f64, longitude: f64) -> PlaceDetails {
    PlaceDetails {
        name: name.to_string(),
        url: format!("https://maps.google.com/?q={name}"),
        latitude,
        longitude,
        photo_references: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// MemoryDb
// ---------------------------------------------------------------------------

/// In-memory places and likes. Share one instance behind Arc for both stores.
pub struct MemoryDb {
    places: Mutex<Vec<Place>>,
    likes: Mutex<HashMap<(String, i64), bool>>,
    batch_inserts: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            places: Mutex::new(Vec::new()),
            likes: Mutex::new(HashMap::new()),
            batch_inserts: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        })
    }

    /// Seed a place and return it with its assigned id
    pub fn seed(&self, google_place_id: &str, latitude: f64, longitude: f64) -> Place {
        self.push(NewPlace {
            google_place_id: google_place_id.to_string(),
            name: format!("Place {google_place_id}"),
            url: format!("https://maps.google.com/?q={google_place_id}"),
            latitude,
            longitude,
            photo_url: None,
        })
    }

    pub fn seed_like(&self, device_id: &str, place_id: i64, liked: bool) {
        self.likes
            .lock()
            .unwrap()
            .insert((device_id.to_string(), place_id), liked);
    }

    /// Make every subsequent call fail with a database error
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn places(&self) -> Vec<Place> {
        self.places.lock().unwrap().clone()
    }

    pub fn like_rows(&self) -> Vec<(String, i64, bool)> {
        self.likes
            .lock()
            .unwrap()
            .iter()
            .map(|((device, place), liked)| (device.clone(), *place, *liked))
            .collect()
    }

    pub fn batch_inserts(&self) -> usize {
        self.batch_inserts.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), PlacesError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PlacesError::DatabaseError("MemoryDb: unavailable".to_string()));
        }
        Ok(())
    }

    fn push(&self, place: NewPlace) -> Place {
        let mut places = self.places.lock().unwrap();
        if let Some(existing) = places
            .iter()
            .find(|p| p.google_place_id == place.google_place_id)
        {
            return existing.clone();
        }

        let stored = Place {
            id: places.len() as i64 + 1,
            google_place_id: place.google_place_id,
            name: place.name,
            url: place.url,
            latitude: place.latitude,
            longitude: place.longitude,
            photo_url: place.photo_url,
        };
        places.push(stored.clone());
        stored
    }
}

#[async_trait]
impl PlaceStore for MemoryDb {
    async fn find_by_external_ids(
        &self,
        google_place_ids: &[String],
    ) -> Result<Vec<Place>, PlacesError> {
        self.check()?;
        Ok(self
            .places
            .lock()
            .unwrap()
            .iter()
            .filter(|p| google_place_ids.contains(&p.google_place_id))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Place, PlacesError> {
        self.check()?;
        self.places
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| PlacesError::NotFound(id.to_string()))
    }

    async fn insert(&self, place: &NewPlace) -> Result<Place, PlacesError> {
        self.check()?;
        Ok(self.push(place.clone()))
    }

    async fn insert_batch(&self, places: &[NewPlace]) -> Result<Vec<Place>, PlacesError> {
        self.check()?;
        self.batch_inserts.fetch_add(1, Ordering::SeqCst);
        Ok(places.iter().cloned().map(|p| self.push(p)).collect())
    }

    async fn exists_by_external_id(&self, google_place_id: &str) -> Result<bool, PlacesError> {
        self.check()?;
        Ok(self
            .places
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.google_place_id == google_place_id))
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, PlacesError> {
        self.check()?;
        Ok(self.places.lock().unwrap().iter().any(|p| p.id == id))
    }

    async fn find_liked_by_device(&self, device_id: &str) -> Result<Vec<Place>, PlacesError> {
        self.check()?;
        let likes = self.likes.lock().unwrap();
        Ok(self
            .places
            .lock()
            .unwrap()
            .iter()
            .filter(|p| likes.get(&(device_id.to_string(), p.id)) == Some(&true))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LikeStore for MemoryDb {
    async fn upsert(&self, device_id: &str, place_id: i64, liked: bool) -> Result<(), PlacesError> {
        self.check()?;
        self.seed_like(device_id, place_id, liked);
        Ok(())
    }

    async fn batch_get(
        &self,
        device_id: &str,
        place_ids: &[i64],
    ) -> Result<HashMap<i64, bool>, PlacesError> {
        self.check()?;
        Ok(self
            .likes
            .lock()
            .unwrap()
            .iter()
            .filter(|((device, place), _)| device == device_id && place_ids.contains(place))
            .map(|((_, place), liked)| (*place, *liked))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryBucket
// ---------------------------------------------------------------------------

/// Object bucket backed by a map. Clones share state.
#[derive(Clone)]
pub struct MemoryBucket {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    writes: Arc<AtomicUsize>,
    failing: bool,
}

impl MemoryBucket {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            writes: Arc::new(AtomicUsize::new(0)),
            failing: false,
        }
    }

    pub fn with_object(self, key: &str, data: Vec<u8>) -> Self {
        self.objects.lock().unwrap().insert(key.to_string(), data);
        self
    }

    /// Every write fails
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectBucket for MemoryBucket {
    async fn exists(&self, key: &str) -> Result<bool, PlacesError> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> Result<(), PlacesError> {
        if self.failing {
            return Err(PlacesError::StorageError("MemoryBucket: write refused".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://storage.test/photos/{key}")
    }
}
