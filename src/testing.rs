//! Fixtures shared by the unit tests.

use crate::{
    error::{
        EmitError,
        FetchError,
    },
    fetcher::SnapshotSource,
    metrics,
    sink::MetricsSink,
    snapshot::Snapshot,
};
use reqwest::StatusCode;
use std::{
    collections::VecDeque,
    future::Future,
    io,
    pin::Pin,
    sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Arc,
        Mutex,
    },
};
use tracing::subscriber::DefaultGuard;

pub(crate) const HEADER: &str = "# pxname,svname,qcur,qmax,scur,smax,slim,stot,bin,bout,dreq,dresp,ereq,econ,eresp,\
wretr,wredis,status,weight,act,bck,chkfail,chkdown,lastchg,downtime,qlimit,pid,iid,sid,throttle,lbtot,tracked,type,\
rate,rate_lim,rate_max,check_status,check_code,check_duration,hrsp_1xx,hrsp_2xx,hrsp_3xx,hrsp_4xx,hrsp_5xx,\
hrsp_other,hanafail,req_rate,req_rate_max,req_tot,cli_abrt,srv_abrt,comp_in,comp_out,comp_byp,comp_rsp,lastsess,\
last_chk,last_agt,qtime,ctime,rtime,ttime,";

const COLUMNS: usize = 62;

/// One CSV line with the given metric columns set and everything else empty.
pub(crate) fn row(name: &str, role: &str, values: &[(&str, i64)]) -> String {
    let mut fields = vec![String::new(); COLUMNS];
    fields[0] = name.to_string();
    fields[1] = role.to_string();
    for (metric, value) in values {
        let def = metrics::find(metric).unwrap_or_else(|| panic!("unknown metric {metric}"));
        fields[def.position] = value.to_string();
    }
    format!("{},", fields.join(","))
}

pub(crate) fn csv_body(rows: &[String]) -> String {
    let mut body = String::from(HEADER);
    body.push('\n');
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    body
}

pub(crate) fn snapshot(rows: &[String]) -> Snapshot {
    Snapshot::parse(&csv_body(rows)).unwrap()
}

pub(crate) fn unavailable() -> FetchError {
    FetchError::Status(StatusCode::SERVICE_UNAVAILABLE)
}

/// Answers fetches from a queue and fails once the queue is drained.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Snapshot, FetchError>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub(crate) fn new(responses: impl IntoIterator<Item = Result<Snapshot, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SnapshotSource for ScriptedSource {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Snapshot, FetchError>> + Send + '_>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(unavailable()))
        })
    }
}

/// Keeps every line it is asked to send, failing those that contain `fail_on`.
#[derive(Default)]
pub(crate) struct RecordingSink {
    lines: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingSink {
    pub(crate) fn failing_on(pattern: &str) -> Self {
        Self {
            lines: Mutex::default(),
            fail_on: Some(pattern.to_string()),
        }
    }

    /// Sent lines in sorted order, emission order is not defined.
    pub(crate) fn lines(&self) -> Vec<String> {
        let mut lines = self.lines.lock().unwrap().clone();
        lines.sort();
        lines
    }

    pub(crate) fn take(&self) -> Vec<String> {
        let mut lines = std::mem::take(&mut *self.lines.lock().unwrap());
        lines.sort();
        lines
    }
}

impl MetricsSink for RecordingSink {
    fn send<'a>(&'a self, line: &'a str) -> Pin<Box<dyn Future<Output = Result<(), EmitError>> + Send + 'a>> {
        Box::pin(async move {
            if self.fail_on.as_deref().is_some_and(|pattern| line.contains(pattern)) {
                return Err(std::io::Error::other("rejected").into());
            }
            self.lines.lock().unwrap().push(line.to_string());
            Ok(())
        })
    }
}

/// Formatted log output of the current thread, captured at `debug` and above.
#[derive(Clone, Default)]
pub(crate) struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes this thread's logs into a [`LogBuffer`] until the guard is dropped.
pub(crate) fn capture_logs() -> (DefaultGuard, LogBuffer) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (tracing::subscriber::set_default(subscriber), buffer)
}
