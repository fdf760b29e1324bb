use ringbuf::traits::Consumer;
use tokio::sync::mpsc;
use tracing::info;

use crate::kernel::event::{Event, InputEvent};
use crate::kernel::time::SessionTimer;

/// Pops fixed-size blocks off the capture ring buffer and forwards them to
/// the kernel as stamped events. Runs on its own OS thread at the device's
/// natural rate; it buffers locally and never waits on the network.
pub struct BlockAssembler<C>
where
    C: Consumer<Item = f32> + Send,
{
    consumer: C,
    tx: mpsc::Sender<Event>,
    timer: SessionTimer,
    block_size: usize,
}

impl<C> BlockAssembler<C>
where
    C: Consumer<Item = f32> + Send,
{
    pub fn new(consumer: C, tx: mpsc::Sender<Event>, timer: SessionTimer, block_size: usize) -> Self {
        Self {
            consumer,
            tx,
            timer,
            block_size: block_size.max(1),
        }
    }

    pub fn run(mut self) {
        info!("block assembler started ({} samples/block)", self.block_size);
        let mut block = vec![0.0f32; self.block_size];

        loop {
            if self.consumer.occupied_len() < self.block_size {
                std::thread::sleep(std::time::Duration::from_millis(10));
                continue;
            }

            let _ = self.consumer.pop_slice(&mut block);
            let event = Event::Input(InputEvent::audio(block.clone(), self.timer.now_ms()));
            if self.tx.blocking_send(event).is_err() {
                // Kernel gone; the session is over.
                info!("block assembler stopping, channel closed");
                return;
            }
        }
    }
}
