use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::info;

use super::TrieServeMux;
use crate::handler::Handler;
use crate::server::{HandlerRequest, HandlerResponse};

/// A finished [`TrieServeMux`] that readers serve from while a writer can
/// publish a rebuilt replacement.
///
/// The trie itself is never mutated after publication: registration happens
/// on a private mux which is then swapped in whole. In-flight requests keep
/// the mux they loaded until they finish.
pub struct SharedMux {
    inner: ArcSwap<TrieServeMux>,
}

impl SharedMux {
    #[must_use]
    pub fn new(mux: TrieServeMux) -> Self {
        Self {
            inner: ArcSwap::from_pointee(mux),
        }
    }

    /// Snapshot of the current mux.
    #[must_use]
    pub fn load(&self) -> Arc<TrieServeMux> {
        self.inner.load_full()
    }

    /// Replace the current mux, returning the previous one.
    pub fn publish(&self, mux: TrieServeMux) -> Arc<TrieServeMux> {
        let routes_count = mux.routes().len();
        let previous = self.inner.swap(Arc::new(mux));
        info!(routes_count = routes_count, "Published rebuilt routing table");
        previous
    }

    /// Serve `req` against the current mux.
    pub fn serve(&self, req: &mut HandlerRequest, res: &mut HandlerResponse) {
        let mux = self.inner.load();
        mux.serve(req, res);
    }
}

impl Handler for SharedMux {
    fn serve(&self, req: &HandlerRequest, res: &mut HandlerResponse) {
        let mut req = req.clone();
        SharedMux::serve(self, &mut req, res);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn mux_answering(body: &'static str) -> TrieServeMux {
        let mut mux = TrieServeMux::new();
        mux.handle_fn(
            Method::GET,
            "/version",
            move |_req: &HandlerRequest, res: &mut HandlerResponse| res.write_text(200, body),
        )
        .unwrap();
        mux
    }

    fn get_version(shared: &SharedMux) -> String {
        let mut req = HandlerRequest::new(Method::GET, "/version");
        let mut res = HandlerResponse::new();
        shared.serve(&mut req, &mut res);
        res.body_text()
    }

    #[test]
    fn test_publish_swaps_routes() {
        let shared = SharedMux::new(mux_answering("v1"));
        assert_eq!(get_version(&shared), "v1");

        let snapshot = shared.load();
        let previous = shared.publish(mux_answering("v2"));
        assert_eq!(get_version(&shared), "v2");
        assert!(Arc::ptr_eq(&snapshot, &previous));
    }

    #[test]
    fn test_concurrent_readers() {
        let shared = Arc::new(SharedMux::new(mux_answering("v1")));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let body = get_version(&shared);
                        assert!(body == "v1" || body == "v2");
                    }
                })
            })
            .collect();
        shared.publish(mux_answering("v2"));
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(get_version(&shared), "v2");
    }
}
