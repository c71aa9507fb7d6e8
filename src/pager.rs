/// Number of rows released to the visible window per batch.
pub const BATCH_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    Idle,
    Fetching,
}

/// One granted batch. Tickets travel through the app's message channel so
/// the append happens back on the UI thread; the generation stamp lets the
/// pager throw away completions that belong to a discarded source.
#[derive(Debug, Clone)]
pub struct BatchTicket {
    pub generation: u64,
    pub start: usize,
    pub indices: Vec<usize>,
}

/// Drip-feeds an index source (full catalog or filtered view) into the
/// visible window in fixed-size batches, with at most one batch in flight.
#[derive(Debug)]
pub struct BatchPager {
    source: Vec<usize>,
    cursor: usize,
    batch_size: usize,
    generation: u64,
    state: PagerState,
}

impl BatchPager {
    pub fn new(batch_size: usize) -> Self {
        Self {
            source: Vec::new(),
            cursor: 0,
            batch_size,
            generation: 0,
            state: PagerState::Idle,
        }
    }

    pub fn state(&self) -> PagerState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.source.len()
    }

    /// Discard the current source and any in-flight batch. Returns the new
    /// generation; a source computed for it is handed back via
    /// `install_source`.
    pub fn invalidate(&mut self) -> u64 {
        self.generation += 1;
        self.cursor = 0;
        self.source.clear();
        self.state = PagerState::Idle;
        self.generation
    }

    /// Install a freshly computed source. Rejected (returns false) when the
    /// pager has been invalidated again since `generation` was handed out.
    pub fn install_source(&mut self, generation: u64, source: Vec<usize>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.source = source;
        self.cursor = 0;
        self.state = PagerState::Idle;
        true
    }

    /// Grant the next batch, or None while one is already in flight or the
    /// source is exhausted. Concurrent callers collapse into the in-flight
    /// fetch; nothing queues.
    pub fn request_next_batch(&mut self) -> Option<BatchTicket> {
        if self.state == PagerState::Fetching || self.is_exhausted() {
            return None;
        }

        let end = (self.cursor + self.batch_size).min(self.source.len());
        let ticket = BatchTicket {
            generation: self.generation,
            start: self.cursor,
            indices: self.source[self.cursor..end].to_vec(),
        };

        self.state = PagerState::Fetching;
        Some(ticket)
    }

    /// Finish a batch. Stale tickets (issued before an invalidate) are
    /// discarded and the cursor stays put.
    pub fn complete(&mut self, ticket: &BatchTicket) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.cursor = ticket.start + ticket.indices.len();
        self.state = PagerState::Idle;
        true
    }
}

impl Default for BatchPager {
    fn default() -> Self {
        Self::new(BATCH_SIZE)
    }
}
