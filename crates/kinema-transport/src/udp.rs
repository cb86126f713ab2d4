//! UDP face tracker receiver

use std::net::SocketAddr;
use std::sync::Arc;

use kinema_core::{FaceSample, KinemaError, KinemaResult};
use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

use crate::{decode_face_packet, LatestSlot, MAX_PACKET_SIZE};

/// Receive loop counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    pub packets: u64,
    pub decoded: u64,
    pub decode_errors: u64,
    pub receive_errors: u64,
}

/// Bound UDP socket for an external face tracker
pub struct FaceTrackerReceiver {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
}

impl FaceTrackerReceiver {
    /// Bind to a local address
    pub async fn bind(addr: SocketAddr) -> KinemaResult<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| KinemaError::TransportError(e.to_string()))?;

        let local_addr = socket
            .local_addr()
            .map_err(|e| KinemaError::TransportError(e.to_string()))?;

        Ok(FaceTrackerReceiver {
            socket: Arc::new(socket),
            local_addr,
        })
    }

    /// Get local address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Receive and decode one datagram
    pub async fn recv_sample(&self) -> KinemaResult<(FaceSample, SocketAddr)> {
        let mut buf = vec![0u8; MAX_PACKET_SIZE];
        let (len, addr) = self
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(|e| KinemaError::TransportError(e.to_string()))?;

        let sample = decode_face_packet(&buf[..len])?;
        Ok((sample, addr))
    }

    /// Start a background receive loop publishing into `slot`
    ///
    /// The loop ends once every other handle to the slot is dropped and the
    /// next datagram arrives, or when the returned handle is aborted.
    pub fn spawn(self, slot: LatestSlot<FaceSample>) -> ReceiverHandle {
        let stats = Arc::new(Mutex::new(ReceiverStats::default()));
        let task_stats = Arc::clone(&stats);
        let socket = self.socket;
        let local_addr = self.local_addr;

        let task = tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_PACKET_SIZE];
            loop {
                match socket.recv_from(&mut buf).await {
                    Ok((len, addr)) => {
                        if slot.is_orphaned() {
                            break; // Frame loop gone
                        }
                        task_stats.lock().packets += 1;
                        match decode_face_packet(&buf[..len]) {
                            Ok(sample) => {
                                task_stats.lock().decoded += 1;
                                slot.publish(sample);
                            }
                            Err(e) => {
                                task_stats.lock().decode_errors += 1;
                                tracing::warn!(%addr, error = %e, "dropping face tracker packet");
                            }
                        }
                    }
                    Err(e) => {
                        task_stats.lock().receive_errors += 1;
                        tracing::warn!("face tracker receive error: {}", e);
                    }
                }
            }
            tracing::debug!(%local_addr, "face tracker receive loop stopped");
        });

        ReceiverHandle {
            task,
            stats,
            local_addr,
        }
    }
}

/// Running receive loop
pub struct ReceiverHandle {
    task: JoinHandle<()>,
    stats: Arc<Mutex<ReceiverStats>>,
    local_addr: SocketAddr,
}

impl ReceiverHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> ReceiverStats {
        *self.stats.lock()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for ReceiverHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
