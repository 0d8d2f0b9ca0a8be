/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::{
    io,
    sync::{
        mpsc::{self, RecvTimeoutError, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::trace;

use crate::fault_access_point::FaultTarget;

/// Background thread that periodically revokes access to all resident pages.
///
/// The thread sleeps on a channel: every timeout triggers a sweep,
/// dropping the sender stops it.
pub(crate) struct ReclaimTicker {
    stop_sender: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ReclaimTicker {
    pub(crate) fn start(target: Arc<dyn FaultTarget>, interval: Duration) -> io::Result<Self> {
        let (stop_sender, stop_receiver) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("vmem-reclaim".to_string())
            .spawn(move || loop {
                match stop_receiver.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let marked = target.reclaim_sweep();
                        // the lock is released again, so logging is fine here
                        trace!("Reclaim sweep marked {} pages", marked);
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        Ok(Self {
            stop_sender: Some(stop_sender),
            handle: Some(handle),
        })
    }

    /// Stops the thread and waits for it to finish
    pub(crate) fn stop(&mut self) {
        // disconnects the channel
        drop(self.stop_sender.take());

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Reclaim ticker panicked");
            }
        }
    }
}

impl Drop for ReclaimTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
