//! FIX 4.4 Client Example
//!
//! Logs on, probes the session with a TestRequest, sends one order, waits for
//! its fill and logs out.

use bytes::BytesMut;
use fixgate::prelude::*;
use fixgate::core::format_utc_timestamp;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Decoder;
use tracing::{info, warn};

mod common;
use common::{ExampleConfig, init_logging};

const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

struct Client {
    stream: TcpStream,
    builder: MessageBuilder,
    codec: FixFrameCodec,
    buf: BytesMut,
}

impl Client {
    async fn send(&mut self, msg_type: MsgType, fields: &[(u32, String)]) -> anyhow::Result<()> {
        let message = self.builder.build(&msg_type, fields);
        self.stream.write_all(&message).await?;
        info!("Sent {}", msg_type);
        Ok(())
    }

    /// Reads messages until one of type `wanted` arrives.
    async fn expect(&mut self, wanted: MsgType) -> anyhow::Result<FieldMap> {
        loop {
            let fields = timeout(REPLY_TIMEOUT, self.read()).await??;
            let msg_type = MsgType::from_value(fields.get_or_empty(tags::MSG_TYPE));
            if msg_type == wanted {
                return Ok(fields);
            }
            info!("Skipping {} while waiting for {}", msg_type, wanted);
        }
    }

    async fn read(&mut self) -> anyhow::Result<FieldMap> {
        loop {
            if let Some(frame) = self.codec.decode(&mut self.buf)? {
                return Ok(parse_fields(&frame)?.fields);
            }
            if self.stream.read_buf(&mut self.buf).await? == 0 {
                anyhow::bail!("server closed the connection");
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::client();
    info!("FIX.4.4 client connecting to {}", cfg.addr());

    let stream = TcpStream::connect(cfg.addr()).await?;
    let mut builder = MessageBuilder::new("FIX.4.4");
    builder.set_comp_ids(cfg.sender_comp_id.clone(), cfg.target_comp_id.clone());
    let mut client = Client {
        stream,
        builder,
        codec: FixFrameCodec::new(),
        buf: BytesMut::with_capacity(4096),
    };

    client
        .send(
            MsgType::Logon,
            &[
                (tags::ENCRYPT_METHOD, "0".to_string()),
                (tags::HEART_BT_INT, cfg.heartbeat_interval.to_string()),
            ],
        )
        .await?;
    let logon = client.expect(MsgType::Logon).await?;
    info!(
        "Logon OK, heartbeat interval {}s",
        logon.get_or_empty(tags::HEART_BT_INT)
    );

    client
        .send(MsgType::TestRequest, &[(tags::TEST_REQ_ID, "PING-1".to_string())])
        .await?;
    let heartbeat = client.expect(MsgType::Heartbeat).await?;
    if heartbeat.get(tags::TEST_REQ_ID) != Some("PING-1") {
        warn!("Heartbeat did not echo TestReqID");
    }

    let transact_time = format_utc_timestamp(chrono::Utc::now());
    client
        .send(
            MsgType::NewOrderSingle,
            &[
                (tags::CL_ORD_ID, "ORD-1".to_string()),
                (tags::SYMBOL, "AAPL".to_string()),
                (tags::SIDE, "1".to_string()),
                (tags::ORDER_QTY, "100".to_string()),
                (tags::PRICE, "150.25".to_string()),
                (tags::TRANSACT_TIME, transact_time),
            ],
        )
        .await?;
    let report = client.expect(MsgType::ExecutionReport).await?;
    info!(
        "Fill: OrderID={} CumQty={} AvgPx={}",
        report.get_or_empty(tags::ORDER_ID),
        report.get_or_empty(tags::CUM_QTY),
        report.get_or_empty(tags::AVG_PX)
    );

    client.send(MsgType::Logout, &[]).await?;
    let logout = client.expect(MsgType::Logout).await?;
    info!("Logged out: {}", logout.get_or_empty(tags::TEXT));

    Ok(())
}
