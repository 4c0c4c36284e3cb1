mod common;

use lzwdec::decode::Decoder;
use tokio::io::AsyncWriteExt;
use tokio_util::compat::TokioAsyncReadCompatExt;

#[tokio::test(flavor = "multi_thread")]
async fn async_decode() {
    let data = common::text(1 << 18);
    let encoded = common::encode(&data);

    let (mut writer, reader) = tokio::io::duplex(1 << 12);
    let feeder = tokio::spawn(async move {
        writer.write_all(&encoded).await?;
        writer.shutdown().await?;
        Ok::<_, std::io::Error>(encoded.len())
    });

    let decoder = Decoder::new();
    let mut decoded = vec![];
    let result = decoder
        .into_async(&mut decoded)
        .decode_all(reader.compat())
        .await;

    let sent = feeder.await.unwrap().unwrap();
    assert!(result.status.is_ok(), "{:?}", result.status);
    assert_eq!(result.bytes_read, sent);
    assert_eq!(result.bytes_written, data.len());
    assert!(decoded == data);
}

#[tokio::test]
async fn async_decode_corrupt() {
    let data = common::pack(&[(65, 9), (257, 9)]);

    let mut decoded = vec![];
    let result = Decoder::new()
        .into_async(&mut decoded)
        .decode_all(futures::io::Cursor::new(data))
        .await;

    let err = result.status.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    assert!(decoded.is_empty());
}
