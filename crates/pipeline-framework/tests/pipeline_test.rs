use async_trait::async_trait;
use pipeline_framework::mock::SharedBuffer;
use pipeline_framework::{BusyBoard, BusyFlag, EventLog, HandoffQueue, Journal, Latch, Source};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

// --- Test Source ---

/// Hands out `0..limit`, one every `gap`.
struct Ticker {
    next: u32,
    limit: u32,
    gap: Duration,
}

#[async_trait]
impl Source<u32> for Ticker {
    async fn next(&mut self) -> Option<u32> {
        if self.next == self.limit {
            return None;
        }
        tokio::time::sleep(self.gap).await;
        self.next += 1;
        Some(self.next - 1)
    }

    fn remaining(&self) -> Option<usize> {
        Some((self.limit - self.next) as usize)
    }
}

// --- Stages ---

async fn produce(source: Arc<Mutex<Ticker>>, queue: HandoffQueue<u32>, done: Latch) {
    loop {
        let mut source = source.lock().await;
        match source.next().await {
            Some(item) => {
                queue.push(item);
            }
            None => {
                done.set();
                return;
            }
        }
    }
}

async fn consume(
    queue: HandoffQueue<u32>,
    done: Latch,
    busy: BusyFlag,
    log: EventLog,
) -> Vec<u32> {
    let mut seen = Vec::new();
    loop {
        busy.set();
        let popped = queue.pop_timeout(Duration::from_millis(50)).await;
        busy.clear();
        match popped {
            Ok(item) => {
                log.log(format!("took {item}"));
                queue.task_done().unwrap();
                seen.push(item);
            }
            Err(e) if e.is_timeout() && done.is_set() && queue.is_empty() => break,
            Err(e) => assert!(e.is_timeout()),
        }
    }
    seen
}

/// Two producers share one source behind a lock, two consumers drain the
/// queue with bounded pops; every item comes out exactly once.
#[tokio::test(start_paused = true)]
async fn test_two_stage_pipeline_conserves_items() {
    let buffer = SharedBuffer::new();
    let (journal, writer) = Journal::new(buffer.clone());
    let shutdown = CancellationToken::new();
    let writer = tokio::spawn(writer.run(Duration::from_millis(100), shutdown.clone()));

    let source = Arc::new(Mutex::new(Ticker {
        next: 0,
        limit: 20,
        gap: Duration::from_millis(10),
    }));
    let queue = HandoffQueue::new();
    let done = Latch::new();
    let flags = vec![BusyFlag::new(), BusyFlag::new()];
    let board: BusyBoard = flags.iter().cloned().collect();

    let producers: Vec<_> = (0..2)
        .map(|_| tokio::spawn(produce(source.clone(), queue.clone(), done.clone())))
        .collect();
    let consumers: Vec<_> = flags
        .into_iter()
        .enumerate()
        .map(|(i, flag)| {
            let log = EventLog::new(format!("consumer{i}"), true, journal.clone());
            tokio::spawn(consume(queue.clone(), done.clone(), flag, log))
        })
        .collect();

    for producer in producers {
        producer.await.unwrap();
    }
    let mut all = Vec::new();
    for consumer in consumers {
        all.extend(consumer.await.unwrap());
    }
    all.sort_unstable();

    assert_eq!(all, (0..20).collect::<Vec<_>>());
    assert_eq!(queue.unfinished(), 0);
    assert!(board.all_idle());
    assert_eq!(source.lock().await.remaining(), Some(0));

    shutdown.cancel();
    let written = writer.await.unwrap().unwrap();
    assert_eq!(written, 20);
    assert_eq!(
        buffer.lines().iter().filter(|l| l.contains("] took ")).count(),
        20
    );
}
