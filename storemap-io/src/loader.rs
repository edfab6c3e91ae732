//! Background asset loading
//!
//! The read runs on its own thread and the outcome comes back over a
//! single-slot channel, so the render loop can poll without blocking.

use std::path::{Path, PathBuf};
use std::thread;
use storemap_core::{Error, LoadOutcome};

/// Starts scene reads off the calling thread
pub struct AssetLoader;

impl AssetLoader {
    /// Read the scene at `path` in the background
    pub fn spawn<P: AsRef<Path>>(path: P) -> LoadHandle {
        let path = path.as_ref().to_path_buf();
        let worker_path = path.clone();
        Self::spawn_with(path, move || crate::read_scene(&worker_path))
    }

    /// Run an arbitrary load job in the background
    pub fn spawn_with<F>(label: impl Into<PathBuf>, job: F) -> LoadHandle
    where
        F: FnOnce() -> LoadOutcome + Send + 'static,
    {
        let (sender, receiver) = flume::bounded(1);
        let path = label.into();

        let spawned = thread::Builder::new()
            .name("storemap-asset-loader".to_string())
            .spawn(move || {
                let outcome = job();
                if sender.send(outcome).is_err() {
                    log::debug!("Load handle dropped before the outcome arrived");
                }
            });
        if let Err(e) = spawned {
            log::error!("Failed to start asset loader thread: {}", e);
        }

        LoadHandle {
            receiver,
            path,
            delivered: false,
        }
    }
}

/// Pending result of a background load
pub struct LoadHandle {
    receiver: flume::Receiver<LoadOutcome>,
    path: PathBuf,
    delivered: bool,
}

impl LoadHandle {
    /// Path (or label) of the asset being loaded
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the outcome has already been handed out
    pub fn is_delivered(&self) -> bool {
        self.delivered
    }

    /// Take the outcome if it is ready. Yields `Some` at most once.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        if self.delivered {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(outcome) => {
                self.delivered = true;
                Some(outcome)
            }
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => {
                self.delivered = true;
                Some(Err(self.exited_early()))
            }
        }
    }

    /// Block until the outcome arrives
    pub fn wait(mut self) -> LoadOutcome {
        if self.delivered {
            return Err(Error::Asset(format!("{}: outcome already taken", self.path.display())));
        }
        self.delivered = true;
        self.receiver.recv().unwrap_or_else(|_| Err(self.exited_early()))
    }

    fn exited_early(&self) -> Error {
        Error::Asset(format!("{}: loader exited without a result", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use storemap_core::SceneGraph;

    fn poll_until_ready(handle: &mut LoadHandle) -> LoadOutcome {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(outcome) = handle.poll() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "load did not finish");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_outcome_is_delivered_once() {
        let mut handle = AssetLoader::spawn_with("memory", || Ok(SceneGraph::new("Store")));
        let scene = poll_until_ready(&mut handle).unwrap();
        assert_eq!(scene.node(scene.root()).unwrap().name, "Store");
        assert!(handle.is_delivered());
        assert!(handle.poll().is_none());
    }

    #[test]
    fn test_failure_is_delivered() {
        let handle = AssetLoader::spawn_with("broken.glb", || Err(Error::Asset("bad".to_string())));
        assert!(matches!(handle.wait(), Err(Error::Asset(msg)) if msg == "bad"));
    }

    #[test]
    fn test_panicking_job_reports_error() {
        let mut handle = AssetLoader::spawn_with("panics.glb", || panic!("reader blew up"));
        match poll_until_ready(&mut handle) {
            Err(Error::Asset(msg)) => assert!(msg.contains("without a result")),
            other => panic!("unexpected outcome: {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_missing_file_through_loader() {
        let path = std::env::temp_dir().join("storemap_loader_missing.glb");
        let handle = AssetLoader::spawn(&path);
        assert_eq!(handle.path(), path.as_path());
        assert!(handle.wait().is_err());
    }
}
