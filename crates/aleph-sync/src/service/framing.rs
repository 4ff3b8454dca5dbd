//! Length-prefixed frame codec (§6): a `u32` big-endian byte length
//! followed by that many bytes of `serde_json`-encoded payload. Byte
//! layout of the payload itself is unspecified by design; only the
//! logical fields matter.

use crate::domain::SyncError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Generous cap against a peer claiming an absurd frame length and
/// forcing an unbounded allocation before any bytes are read.
pub const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

pub async fn write_frame<W, T>(stream: &mut W, value: &T) -> Result<(), SyncError>
where
    W: AsyncWrite + Unpin + ?Sized,
    T: Serialize,
{
    let bytes = serde_json::to_vec(value).map_err(|e| SyncError::Malformed(e.to_string()))?;
    if bytes.len() > MAX_FRAME_BYTES {
        return Err(SyncError::FrameTooLarge(bytes.len(), MAX_FRAME_BYTES));
    }
    stream.write_u32(bytes.len() as u32).await?;
    stream.write_all(&bytes).await?;
    stream.flush().await?;
    Ok(())
}

pub async fn read_frame<R, T>(stream: &mut R) -> Result<T, SyncError>
where
    R: AsyncRead + Unpin + ?Sized,
    T: DeserializeOwned,
{
    let len = stream.read_u32().await? as usize;
    if len > MAX_FRAME_BYTES {
        return Err(SyncError::FrameTooLarge(len, MAX_FRAME_BYTES));
    }
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await?;
    serde_json::from_slice(&buf).map_err(|e| SyncError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn a_frame_round_trips_through_an_in_memory_duplex() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        write_frame(&mut a, &vec![1u32, 2, 3]).await.unwrap();
        let got: Vec<u32> = read_frame(&mut b).await.unwrap();
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn a_frame_claiming_more_than_the_cap_is_rejected_before_reading() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_u32((MAX_FRAME_BYTES + 1) as u32).await.unwrap();
        let err = read_frame::<_, Vec<u8>>(&mut b).await.unwrap_err();
        assert!(matches!(err, SyncError::FrameTooLarge(_, _)));
    }
}
