use std::collections::VecDeque;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};

use crate::error::FetchError;

/// Which page to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedQuery {
    /// First page, positioned around the item the screen was opened on.
    Initial { anchor: Option<String> },
    /// The page following `cursor`.
    After { cursor: String },
}

/// Fetches feed pages. Runs on the loader thread, so it may block.
pub trait FeedFetcher: Send + 'static {
    type Item: Send + 'static;

    fn fetch(&mut self, query: &FeedQuery) -> Result<Vec<Self::Item>, FetchError>;
}

struct FeedRequest {
    query: FeedQuery,
    generation: u64,
}

/// Result sent back from the loader thread.
#[derive(Debug)]
pub struct FeedResponse<T> {
    pub query: FeedQuery,
    pub result: Result<Vec<T>, FetchError>,
    pub generation: u64,
}

/// Background page fetching with generation-based cancellation.
///
/// An initial request bumps the generation; responses to anything issued
/// before it are dropped on receipt.
pub struct FeedLoader<T> {
    request_tx: Sender<FeedRequest>,
    result_rx: Receiver<FeedResponse<T>>,
    generation: u64,
    in_flight: usize,
    _thread: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> FeedLoader<T> {
    pub fn spawn<F>(fetcher: F) -> Self
    where
        F: FeedFetcher<Item = T>,
    {
        let (request_tx, request_rx) = bounded::<FeedRequest>(16);
        let (result_tx, result_rx) = bounded::<FeedResponse<T>>(16);

        let handle = thread::Builder::new()
            .name("reelswap-feed-loader".into())
            .spawn(move || {
                Self::fetch_thread(fetcher, request_rx, result_tx);
            })
            .expect("failed to spawn feed loader thread");

        Self {
            request_tx,
            result_rx,
            generation: 0,
            in_flight: 0,
            _thread: Some(handle),
        }
    }

    /// Queue a fetch. Returns the generation it was issued under.
    pub fn request(&mut self, query: FeedQuery) -> Result<u64, FetchError> {
        if matches!(query, FeedQuery::Initial { .. }) {
            self.generation += 1;
        }
        let generation = self.generation;

        match self.request_tx.try_send(FeedRequest { query, generation }) {
            Ok(()) => {
                self.in_flight += 1;
                Ok(generation)
            }
            Err(TrySendError::Full(req)) => {
                log::warn!("Feed loader queue full, dropping {:?}", req.query);
                Err(FetchError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(FetchError::WorkerGone),
        }
    }

    /// Poll for a finished fetch from the current generation.
    pub fn try_recv(&mut self) -> Option<FeedResponse<T>> {
        loop {
            match self.result_rx.try_recv() {
                Ok(response) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    if response.generation == self.generation {
                        return Some(response);
                    }
                    log::debug!(
                        "Discarded stale feed response (gen {} vs current {})",
                        response.generation,
                        self.generation
                    );
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Feed loader thread disconnected");
                    self.in_flight = 0;
                    return None;
                }
            }
        }
    }

    /// Block until a current-generation response arrives or nothing is pending.
    pub fn recv_blocking(&mut self) -> Option<FeedResponse<T>> {
        while self.in_flight > 0 {
            let response = match self.result_rx.recv() {
                Ok(r) => r,
                Err(_) => {
                    self.in_flight = 0;
                    return None;
                }
            };
            self.in_flight -= 1;
            if response.generation == self.generation {
                return Some(response);
            }
            log::debug!(
                "Discarded stale feed response (gen {} vs current {})",
                response.generation,
                self.generation
            );
        }
        None
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_pending(&self) -> bool {
        self.in_flight > 0
    }

    fn fetch_thread<F>(
        mut fetcher: F,
        request_rx: Receiver<FeedRequest>,
        result_tx: Sender<FeedResponse<T>>,
    ) where
        F: FeedFetcher<Item = T>,
    {
        let mut queue: VecDeque<FeedRequest> = VecDeque::new();
        loop {
            if queue.is_empty() {
                match request_rx.recv() {
                    Ok(r) => queue.push_back(r),
                    Err(_) => {
                        log::debug!("Feed loader thread exiting (channel closed)");
                        return;
                    }
                }
            }
            while let Ok(newer) = request_rx.try_recv() {
                queue.push_back(newer);
            }

            let latest = queue.iter().map(|r| r.generation).max().unwrap_or(0);
            let Some(request) = queue.pop_front() else {
                continue;
            };

            // Superseded by a newer initial load: answer without fetching so
            // the caller's in-flight count stays balanced.
            let result = if request.generation < latest {
                log::debug!(
                    "Feed loader: skipping gen {} for newer gen {latest}",
                    request.generation
                );
                Ok(Vec::new())
            } else {
                log::info!("Fetching feed page {:?}", request.query);
                let result = fetcher.fetch(&request.query);
                if let Err(e) = &result {
                    log::warn!("Feed fetch {:?} failed: {e}", request.query);
                }
                result
            };

            let response = FeedResponse {
                query: request.query,
                result,
                generation: request.generation,
            };
            if result_tx.send(response).is_err() {
                log::debug!("Feed loader thread exiting (receiver dropped)");
                return;
            }
        }
    }
}
