use example_tenacio_rpc_service_definition::format_reader::pixel_type;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tenacio::Context;
use tenacio_rpc_service_endpoint::error::HandlerPayloadError;
use tokio::sync::Mutex;

/// Dimensions and pixel layout of one series of an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesInfo {
    pub size_x: i32,
    pub size_y: i32,
    pub size_z: i32,
    pub size_c: i32,
    pub size_t: i32,
    pub pixel_type: i32,
    /// Always starts with `XY`; the remaining three letters order Z, C and T.
    pub dimension_order: String,
    pub rgb: bool,
}

impl SeriesInfo {
    pub fn image_count(&self) -> i32 {
        self.size_z * self.size_c * self.size_t
    }

    fn sizes(&self, axis: char) -> i32 {
        match axis {
            'Z' => self.size_z,
            'C' => self.size_c,
            _ => self.size_t,
        }
    }

    /// Rasterizes (z, c, t) following the dimension order.
    pub fn index(&self, z: i32, c: i32, t: i32) -> Option<i32> {
        if !(0..self.size_z).contains(&z)
            || !(0..self.size_c).contains(&c)
            || !(0..self.size_t).contains(&t)
        {
            return None;
        }
        let mut index = 0;
        let mut stride = 1;
        for axis in self.dimension_order.chars().skip(2) {
            let position = match axis {
                'Z' => z,
                'C' => c,
                _ => t,
            };
            index += position * stride;
            stride *= self.sizes(axis);
        }
        Some(index)
    }

    /// Inverse of [`SeriesInfo::index`], returned as `[z, c, t]`.
    pub fn zct_coords(&self, index: i32) -> Option<[i32; 3]> {
        if !(0..self.image_count()).contains(&index) {
            return None;
        }
        let mut coords = [0; 3];
        let mut rest = index;
        for axis in self.dimension_order.chars().skip(2) {
            let size = self.sizes(axis);
            let slot = match axis {
                'Z' => 0,
                'C' => 1,
                _ => 2,
            };
            coords[slot] = rest % size;
            rest /= size;
        }
        Some(coords)
    }

    pub fn plane_len(&self) -> usize {
        let bytes_per_pixel = pixel_type::bytes_per_pixel(self.pixel_type).unwrap_or(1);
        self.size_x as usize * self.size_y as usize * bytes_per_pixel
    }
}

/// A file the servant can open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: String,
    pub series: Vec<SeriesInfo>,
}

/// Images by id.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    images: HashMap<String, ImageInfo>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, id: impl Into<String>, image: ImageInfo) -> Self {
        self.images.insert(id.into(), image);
        self
    }

    pub fn get(&self, id: &str) -> Option<&ImageInfo> {
        self.images.get(id)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// A few made-up files covering single and multi-series images.
    pub fn synthetic() -> Self {
        let series = |x, y, z, c, t, pixel_type, order: &str, rgb| SeriesInfo {
            size_x: x,
            size_y: y,
            size_z: z,
            size_c: c,
            size_t: t,
            pixel_type,
            dimension_order: order.to_string(),
            rgb,
        };
        Catalogue::new()
            .with_image(
                "a.tif",
                ImageInfo {
                    format: "Tagged Image File Format".into(),
                    series: vec![series(512, 512, 5, 3, 1, pixel_type::UINT8, "XYZCT", false)],
                },
            )
            .with_image(
                "plate.nd2",
                ImageInfo {
                    format: "Nikon ND2".into(),
                    series: vec![
                        series(1024, 768, 10, 2, 4, pixel_type::UINT16, "XYCZT", false),
                        series(256, 192, 1, 2, 4, pixel_type::UINT16, "XYCZT", false),
                    ],
                },
            )
            .with_image(
                "photo.png",
                ImageInfo {
                    format: "Portable Network Graphics".into(),
                    series: vec![series(64, 48, 1, 3, 1, pixel_type::UINT8, "XYCZT", true)],
                },
            )
    }
}

/// Declared errors a reader reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    FileNotFound,
    NoFileOpen,
    SeriesOutOfRange(i32),
    PlaneOutOfRange(i32),
    CoordinatesOutOfRange { z: i32, c: i32, t: i32 },
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::FileNotFound => write!(f, "file not found"),
            ReaderError::NoFileOpen => write!(f, "no file open"),
            ReaderError::SeriesOutOfRange(series) => write!(f, "series {series} out of range"),
            ReaderError::PlaneOutOfRange(no) => write!(f, "plane {no} out of range"),
            ReaderError::CoordinatesOutOfRange { z, c, t } => {
                write!(f, "coordinates z={z} c={c} t={t} out of range")
            }
        }
    }
}

impl std::error::Error for ReaderError {}

impl From<ReaderError> for HandlerPayloadError {
    fn from(err: ReaderError) -> Self {
        HandlerPayloadError::message(err.to_string())
    }
}

/// Context key naming the reader a call addresses.
pub const READER_CONTEXT_KEY: &str = "reader";

/// Reader addressed by calls whose context names none.
pub const DEFAULT_READER: &str = "";

/// How long an untouched reader is kept before it may be evicted.
pub const DEFAULT_READER_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// A call context addressing the reader `reader_id`.
pub fn reader_context(reader_id: &str) -> Context {
    Context::from_iter([(READER_CONTEXT_KEY, reader_id)])
}

/// The reader a call with `context` addresses.
pub fn reader_of(context: &Context) -> &str {
    context.get(READER_CONTEXT_KEY).unwrap_or(DEFAULT_READER)
}

#[derive(Debug, Clone)]
struct ReaderSession {
    current: Option<(String, ImageInfo)>,
    series: i32,
    metadata_collected: bool,
    last_used: Instant,
}

impl ReaderSession {
    fn new() -> Self {
        Self {
            current: None,
            series: 0,
            metadata_collected: false,
            last_used: Instant::now(),
        }
    }

    fn open(&self) -> Result<(&str, &ImageInfo), ReaderError> {
        self.current
            .as_ref()
            .map(|(id, image)| (id.as_str(), image))
            .ok_or(ReaderError::NoFileOpen)
    }

    fn series(&self) -> Result<&SeriesInfo, ReaderError> {
        let (_, image) = self.open()?;
        image
            .series
            .get(self.series as usize)
            .ok_or(ReaderError::SeriesOutOfRange(self.series))
    }
}

/// Serves the reader interface from a [`Catalogue`].
///
/// Readers are named by the caller through [`READER_CONTEXT_KEY`], so a
/// reader outlives the connection it was opened on. A reader is dropped by
/// `close` or once it has been idle for longer than the idle timeout.
pub struct FormatReaderServant {
    catalogue: Catalogue,
    idle_timeout: Duration,
    sessions: Mutex<HashMap<String, ReaderSession>>,
}

impl FormatReaderServant {
    pub fn new(catalogue: Catalogue) -> Self {
        Self {
            catalogue,
            idle_timeout: DEFAULT_READER_IDLE_TIMEOUT,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Number of readers currently held.
    pub async fn reader_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn with_session<R>(&self, reader: &str, f: impl FnOnce(&mut ReaderSession) -> R) -> R {
        let mut sessions = self.sessions.lock().await;
        if !sessions.contains_key(reader) {
            let idle_timeout = self.idle_timeout;
            let before = sessions.len();
            sessions.retain(|_, session| session.last_used.elapsed() < idle_timeout);
            if sessions.len() < before {
                tracing::debug!(evicted = before - sessions.len(), "evicted idle readers");
            }
        }
        let session = sessions
            .entry(reader.to_string())
            .or_insert_with(ReaderSession::new);
        session.last_used = Instant::now();
        f(session)
    }

    async fn with_series<R>(
        &self,
        reader: &str,
        f: impl FnOnce(&SeriesInfo) -> R,
    ) -> Result<R, ReaderError> {
        self.with_session(reader, |session| session.series().map(f))
            .await
    }

    pub async fn set_id(&self, reader: &str, id: &str) -> Result<(), ReaderError> {
        let image = self
            .catalogue
            .get(id)
            .cloned()
            .ok_or(ReaderError::FileNotFound)?;
        self.with_session(reader, |session| {
            tracing::debug!(reader, id, metadata = session.metadata_collected, "opening file");
            session.current = Some((id.to_string(), image));
            session.series = 0;
        })
        .await;
        Ok(())
    }

    pub async fn close(&self, reader: &str) {
        self.sessions.lock().await.remove(reader);
    }

    pub async fn set_metadata_collected(&self, reader: &str, collect: bool) {
        self.with_session(reader, |session| session.metadata_collected = collect)
            .await
    }

    pub async fn is_metadata_collected(&self, reader: &str) -> bool {
        self.with_session(reader, |session| session.metadata_collected)
            .await
    }

    pub async fn current_file(&self, reader: &str) -> Result<String, ReaderError> {
        self.with_session(reader, |session| session.open().map(|(id, _)| id.to_string()))
            .await
    }

    pub async fn format(&self, reader: &str) -> Result<String, ReaderError> {
        self.with_session(reader, |session| {
            session.open().map(|(_, image)| image.format.clone())
        })
        .await
    }

    pub async fn series_count(&self, reader: &str) -> Result<i32, ReaderError> {
        self.with_session(reader, |session| {
            session.open().map(|(_, image)| image.series.len() as i32)
        })
        .await
    }

    pub async fn set_series(&self, reader: &str, series: i32) -> Result<(), ReaderError> {
        self.with_session(reader, |session| {
            let (_, image) = session.open()?;
            if !(0..image.series.len() as i32).contains(&series) {
                return Err(ReaderError::SeriesOutOfRange(series));
            }
            session.series = series;
            Ok(())
        })
        .await
    }

    pub async fn series(&self, reader: &str) -> Result<i32, ReaderError> {
        self.with_session(reader, |session| session.open().map(|_| session.series))
            .await
    }

    /// Reads one property of the current series.
    pub async fn series_info<R>(
        &self,
        reader: &str,
        f: impl FnOnce(&SeriesInfo) -> R,
    ) -> Result<R, ReaderError> {
        self.with_series(reader, f).await
    }

    pub async fn index(&self, reader: &str, z: i32, c: i32, t: i32) -> Result<i32, ReaderError> {
        self.with_series(reader, |series| series.index(z, c, t))
            .await?
            .ok_or(ReaderError::CoordinatesOutOfRange { z, c, t })
    }

    pub async fn zct_coords(&self, reader: &str, index: i32) -> Result<Vec<i32>, ReaderError> {
        self.with_series(reader, |series| series.zct_coords(index))
            .await?
            .map(Vec::from)
            .ok_or(ReaderError::PlaneOutOfRange(index))
    }

    /// Synthesizes plane `no` of the current series.
    pub async fn open_bytes(&self, reader: &str, no: i32) -> Result<Vec<u8>, ReaderError> {
        self.with_series(reader, |series| {
            if !(0..series.image_count()).contains(&no) {
                return Err(ReaderError::PlaneOutOfRange(no));
            }
            Ok((0..series.plane_len())
                .map(|i| (i as i32).wrapping_add(no) as u8)
                .collect())
        })
        .await?
    }
}
