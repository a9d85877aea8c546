use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

pub type FramedIo<T> = Framed<T, LengthDelimitedCodec>;

// Node dumps of deep scenes get large; 16 MiB leaves generous headroom.
const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

pub fn codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .max_frame_length(MAX_FRAME_LEN)
        .new_codec()
}

pub fn into_framed<T>(io: T) -> FramedIo<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    Framed::new(io, codec())
}
