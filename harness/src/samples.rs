//! "Now"-stamped sample messages for smoke testing a live pipeline by hand.

use chrono::{DateTime, Local};

pub const CAPUTLOG_TIME_FORMAT: &str = "%d-%b-%y %H:%M:%S";

pub const SAMPLE_TYPES: &[&str] = &["epics_errlog", "caputlog", "plc", "python_json_udp"];

const PYTHON_SAMPLE: &str = r##"{"msg": "** log system test**", "pathname": "logcheck/harness/src/samples.rs", "filename": "samples.rs", "exc_text": null, "lineno": 66, "schema": "python-event-0", "source": "logcheck.samples:66", "versions": {"logcheck": "0.1.0"}, "hostname": "ctl-logdev01", "host_info": {"system": "Linux", "node": "ctl-logdev01", "release": "3.10.0-1127.10.1.el7.x86_64", "version": "#1 SMP Tue May 26 15:05:43 EDT 2020", "machine": "x86_64", "processor": "x86_64"}}"##;

/// Sample raw message for `message_type`, stamped with `now` where the format
/// carries a timestamp. `None` for types without a sample.
pub fn sample_message(message_type: &str, now: DateTime<Local>) -> Option<String> {
    let message = match message_type {
        "epics_errlog" => "IOC=LogTest sevr=major ** log system test message **".to_string(),
        "caputlog" => format!(
            "IOC=LogTest {} ctl-logdev01 klauer CAPUTLOGTEST:VALUE new=0 old=1 min=0 max=1",
            now.format(CAPUTLOG_TIME_FORMAT)
        ),
        "plc" => {
            let ts = now.timestamp_micros() as f64 / 1e6;
            serde_json::json!({
                "schema": "twincat-event-0",
                "ts": ts,
                "plc": "LogTest",
                "severity": 4,
                "id": 0,
                "event_class": "C0FFEEC0-FFEE-C0FF-EEC0-FFEEC0FFEEC0",
                "msg": "Critical (Log system test.)",
                "source": "pcds_logstash.testing.fbLogger/Debug",
                "event_type": 3,
                "json": "{}",
            })
            .to_string()
        }
        "python_json_udp" => PYTHON_SAMPLE.to_string(),
        _ => return None,
    };
    Some(message)
}
