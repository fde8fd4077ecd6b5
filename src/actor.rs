use crate::book::Book;
use crate::config::BookConfig;
use crate::error::BookError;
use crate::event::OrderEvent;
use crate::snapshot::BookSnapshot;
use crate::types::{Order, OrderId, Price, Side, Size};
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, info};

type Reply<T> = oneshot::Sender<T>;

pub enum BookMessage {
    Add(Order, Reply<Result<(), BookError>>),
    Remove(OrderId, Reply<Option<Order>>),
    Modify(OrderId, i64, Reply<Result<Option<Order>, BookError>>),
    Apply(OrderEvent, Reply<Result<(), BookError>>),
    PriceForLevel(Side, usize, Reply<Result<Price, BookError>>),
    TotalSizeForLevel(Side, usize, Reply<Result<Size, BookError>>),
    Orders(Side, Reply<Vec<Order>>),
    RequestSnapshot(usize, Reply<BookSnapshot>),
}

/// Owns the [Book] and serves every request in arrival order.
pub struct BookProcessor {
    book: Book,
    depth: usize,
    pub_interval: Option<Duration>,
    pub_at: Option<Instant>,
    published_seq: Option<u64>,
    book_msg_rx: mpsc::Receiver<BookMessage>,
    book_pub_tx: mpsc::Sender<BookSnapshot>,
}

impl BookProcessor {
    pub fn new(
        config: &BookConfig,
        book_msg_rx: mpsc::Receiver<BookMessage>,
        book_pub_tx: mpsc::Sender<BookSnapshot>,
    ) -> Self {
        Self {
            book: Book::with_config(config),
            depth: config.snapshot_depth,
            pub_interval: config.publish_interval(),
            pub_at: None,
            published_seq: None,
            book_msg_rx,
            book_pub_tx,
        }
    }

    pub async fn run(mut self) {
        info!(symbol = %self.book.symbol(), "book processor started");

        loop {
            let flush_at = self.pending_publish();

            tokio::select! {
                msg = self.book_msg_rx.recv() => {
                    let Some(msg) = msg else { break };
                    self.on_message(msg);
                    self.publish();
                }
                // Flushes a change that landed inside the last publish interval.
                _ = time::sleep_until(flush_at.unwrap_or_else(Instant::now)), if flush_at.is_some() => {
                    self.publish();
                }
            }
        }

        info!(symbol = %self.book.symbol(), "book processor stopped");
    }

    fn on_message(&mut self, msg: BookMessage) {
        // A dropped reply receiver only means the caller stopped waiting.
        match msg {
            BookMessage::Add(order, tx) => {
                let _ = tx.send(self.book.add_order(order));
            }
            BookMessage::Remove(id, tx) => {
                let _ = tx.send(self.book.remove_order(id));
            }
            BookMessage::Modify(id, size, tx) => {
                let _ = tx.send(self.book.modify_order_size(id, size));
            }
            BookMessage::Apply(event, tx) => {
                let _ = tx.send(self.book.apply(event));
            }
            BookMessage::PriceForLevel(side, level, tx) => {
                let _ = tx.send(self.book.price_for_level(side, level));
            }
            BookMessage::TotalSizeForLevel(side, level, tx) => {
                let _ = tx.send(self.book.total_size_for_level(side, level));
            }
            BookMessage::Orders(side, tx) => {
                let _ = tx.send(self.book.orders(side));
            }
            BookMessage::RequestSnapshot(depth, tx) => {
                let _ = tx.send(self.book.snapshot(depth));
            }
        }
    }

    /// When an unpublished change is waiting, the instant it may go out.
    fn pending_publish(&self) -> Option<Instant> {
        self.pub_interval?;
        if self.published_seq == Some(self.book.sequence()) {
            return None;
        }
        Some(self.pub_at.unwrap_or_else(Instant::now))
    }

    fn publish(&mut self) {
        let Some(interval) = self.pub_interval else { return };

        let seq = self.book.sequence();
        if self.published_seq == Some(seq) {
            return;
        }

        let now = Instant::now();
        if self.pub_at.is_some_and(|pub_at| now < pub_at) {
            return;
        }

        // Never stall the book on a slow subscriber; retry after the next interval.
        self.pub_at = Some(now + interval);
        match self.book_pub_tx.try_send(self.book.snapshot(self.depth)) {
            Ok(()) => self.published_seq = Some(seq),
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(symbol = %self.book.symbol(), seq, "snapshot subscriber lagging, skipped publish");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => self.pub_interval = None,
        }
    }
}

/// Book handle that spawns an indefinite tokio future owning the book.
pub struct AsyncBook {
    book_msg_tx: mpsc::Sender<BookMessage>,
    book_pub_rx: mpsc::Receiver<BookSnapshot>,
}

impl AsyncBook {
    /// Must be called from within a tokio runtime.
    pub fn new(config: BookConfig) -> Self {
        let (book_msg_tx, book_msg_rx) = mpsc::channel(config.channel_capacity.max(1));
        let (book_pub_tx, book_pub_rx) = mpsc::channel(1000);

        let processor = BookProcessor::new(&config, book_msg_rx, book_pub_tx);
        tokio::spawn(processor.run());

        Self { book_msg_tx, book_pub_rx }
    }

    /// Next published snapshot. Only yields when a publish interval is configured.
    pub async fn recv(&mut self) -> Option<BookSnapshot> {
        self.book_pub_rx.recv().await
    }

    pub fn handle(&self) -> BookHandle {
        BookHandle {
            tx: self.book_msg_tx.clone(),
        }
    }
}

/// Cloneable client of an [AsyncBook]. Every call is one message to the
/// owning task, so calls from any number of handles are serialised.
#[derive(Clone)]
pub struct BookHandle {
    tx: mpsc::Sender<BookMessage>,
}

impl BookHandle {
    async fn request<T>(&self, msg: impl FnOnce(Reply<T>) -> BookMessage) -> Result<T, BookError> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(msg(tx)).await.map_err(|_| BookError::Closed)?;
        rx.await.map_err(|_| BookError::Closed)
    }

    pub async fn add_order(&self, order: Order) -> Result<(), BookError> {
        self.request(|tx| BookMessage::Add(order, tx)).await?
    }

    pub async fn remove_order(&self, id: OrderId) -> Result<Option<Order>, BookError> {
        self.request(|tx| BookMessage::Remove(id, tx)).await
    }

    pub async fn modify_order_size(&self, id: OrderId, size: i64) -> Result<Option<Order>, BookError> {
        self.request(|tx| BookMessage::Modify(id, size, tx)).await?
    }

    pub async fn apply(&self, event: OrderEvent) -> Result<(), BookError> {
        self.request(|tx| BookMessage::Apply(event, tx)).await?
    }

    pub async fn price_for_level(&self, side: Side, level: usize) -> Result<Price, BookError> {
        self.request(|tx| BookMessage::PriceForLevel(side, level, tx)).await?
    }

    pub async fn total_size_for_level(&self, side: Side, level: usize) -> Result<Size, BookError> {
        self.request(|tx| BookMessage::TotalSizeForLevel(side, level, tx)).await?
    }

    pub async fn orders(&self, side: Side) -> Result<Vec<Order>, BookError> {
        self.request(|tx| BookMessage::Orders(side, tx)).await
    }

    pub async fn snapshot(&self, depth: usize) -> Result<BookSnapshot, BookError> {
        self.request(|tx| BookMessage::RequestSnapshot(depth, tx)).await
    }
}
