use crate::{AssetError, Texture, decode_hdr};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

type LoadResult = Result<Texture, AssetError>;

/// Outcome of polling a [`PendingTexture`].
#[derive(Debug)]
pub enum LoadStatus {
    Pending,
    Loaded(Texture),
    Failed(AssetError),
}

/// Handle to an in-flight texture load.
///
/// The result is delivered over a channel; polling never blocks.
#[derive(Debug)]
pub struct PendingTexture {
    name: String,
    rx: Receiver<LoadResult>,
}

impl PendingTexture {
    fn channel(name: impl Into<String>) -> (Sender<LoadResult>, Self) {
        let (tx, rx) = mpsc::channel();
        (
            tx,
            Self {
                name: name.into(),
                rx,
            },
        )
    }

    /// Name of the requested file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check for a result without blocking.
    pub fn poll(&mut self) -> LoadStatus {
        match self.rx.try_recv() {
            Ok(Ok(texture)) => LoadStatus::Loaded(texture),
            Ok(Err(e)) => LoadStatus::Failed(e),
            Err(TryRecvError::Empty) => LoadStatus::Pending,
            Err(TryRecvError::Disconnected) => {
                LoadStatus::Failed(AssetError::Abandoned(self.name.clone()))
            }
        }
    }

    /// Block until the load resolves. Headless tools only; frames must poll.
    pub fn wait(self) -> LoadResult {
        self.rx
            .recv()
            .unwrap_or_else(|_| Err(AssetError::Abandoned(self.name.clone())))
    }
}

/// Issues non-blocking texture loads.
pub trait TextureLoader {
    /// Start loading `file`. Returns immediately.
    fn load(&mut self, file: &str) -> PendingTexture;
}

/// Radiance HDR loader. Reads and decodes on a worker thread.
#[derive(Debug, Clone, Default)]
pub struct RgbeLoader {
    path: PathBuf,
}

impl RgbeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory that file names passed to `load` are resolved against.
    pub fn set_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_and_decode(path: &Path, name: &str) -> LoadResult {
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        decode_hdr(name, &bytes)
    }
}

impl TextureLoader for RgbeLoader {
    fn load(&mut self, file: &str) -> PendingTexture {
        let full = self.path.join(file);
        let (tx, pending) = PendingTexture::channel(file);
        tracing::debug!(path = %full.display(), "requesting texture");

        let name = file.to_string();
        let worker_tx = tx.clone();
        let spawned = std::thread::Builder::new()
            .name("rgbe-loader".into())
            .spawn(move || {
                let result = Self::read_and_decode(&full, &name);
                // Receiver may be gone if the world was dropped mid-load.
                let _ = worker_tx.send(result);
            });
        if let Err(source) = spawned {
            let _ = tx.send(Err(AssetError::Io {
                path: file.to_string(),
                source,
            }));
        }
        pending
    }
}

/// Loader whose requests are completed by hand, in request order.
///
/// Used by tests and headless runs that need deterministic completion.
#[derive(Debug, Default)]
pub struct ManualLoader {
    queue: VecDeque<(String, Sender<LoadResult>)>,
    requested: Vec<String>,
}

impl ManualLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every file name passed to `load`, oldest first.
    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    /// Resolve the oldest outstanding request. Returns false if none is queued.
    pub fn complete(&mut self, result: LoadResult) -> bool {
        match self.queue.pop_front() {
            Some((name, tx)) => {
                tracing::debug!(name, ok = result.is_ok(), "completing manual load");
                let _ = tx.send(result);
                true
            }
            None => false,
        }
    }

    /// Resolve the oldest outstanding request with a failure.
    pub fn fail(&mut self, reason: &str) -> bool {
        let name = match self.queue.front() {
            Some((name, _)) => name.clone(),
            None => return false,
        };
        self.complete(Err(AssetError::Decode {
            name,
            reason: reason.to_string(),
        }))
    }
}

impl TextureLoader for ManualLoader {
    fn load(&mut self, file: &str) -> PendingTexture {
        let (tx, pending) = PendingTexture::channel(file);
        self.requested.push(file.to_string());
        self.queue.push_back((file.to_string(), tx));
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::tests::tiny_hdr;
    use std::io::Write;

    #[test]
    fn manual_loader_completes_in_order() {
        let mut loader = ManualLoader::new();
        let mut first = loader.load("a.hdr");
        let mut second = loader.load("b.hdr");
        assert_eq!(loader.requested(), ["a.hdr", "b.hdr"]);
        assert!(matches!(first.poll(), LoadStatus::Pending));

        let tex = Texture::from_rgb32f("a.hdr", 1, 1, vec![1.0, 1.0, 1.0]).unwrap();
        assert!(loader.complete(Ok(tex)));
        assert!(matches!(first.poll(), LoadStatus::Loaded(_)));
        assert!(matches!(second.poll(), LoadStatus::Pending));

        assert!(loader.fail("broken"));
        assert!(matches!(second.poll(), LoadStatus::Failed(_)));
        assert!(!loader.complete(Err(AssetError::Abandoned("none".into()))));
    }

    #[test]
    fn dropped_loader_abandons_request() {
        let mut loader = ManualLoader::new();
        let mut pending = loader.load("gone.hdr");
        drop(loader);
        assert!(matches!(
            pending.poll(),
            LoadStatus::Failed(AssetError::Abandoned(_))
        ));
    }

    #[test]
    fn rgbe_loader_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("sky.hdr")).unwrap();
        file.write_all(&tiny_hdr()).unwrap();

        let mut loader = RgbeLoader::new().set_path(dir.path());
        let tex = loader.load("sky.hdr").wait().unwrap();
        assert_eq!(tex.name, "sky.hdr");
        assert_eq!((tex.width, tex.height), (2, 1));
    }

    #[test]
    fn rgbe_loader_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = RgbeLoader::new().set_path(dir.path());
        let err = loader.load("missing.hdr").wait().unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
