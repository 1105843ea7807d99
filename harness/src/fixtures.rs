//! Known raw messages and the normalized fields the pipeline must produce for
//! them.

use crate::checker::{Expectation, MismatchKind};
use serde_json::json;

#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub id: String,
    pub message_type: String,
    pub raw_payload: String,
    pub expectation: Expectation,
}

impl Fixture {
    pub fn new(
        id: impl Into<String>,
        message_type: impl Into<String>,
        raw_payload: impl Into<String>,
        expectation: Expectation,
    ) -> Self {
        Self {
            id: id.into(),
            message_type: message_type.into(),
            raw_payload: raw_payload.into(),
            expectation,
        }
    }
}

/// A fixture whose expectation is deliberately wrong. Running it proves the
/// checker flags every listed key with `expected_failure`.
#[derive(Debug, Clone, PartialEq)]
pub struct FailFixture {
    pub fixture: Fixture,
    pub expected_failure: MismatchKind,
}

const ERRLOG_MAJOR: &str = "IOC=VonHamos01 sevr=major error log! IOC startup";

pub fn pass_fixtures() -> Vec<Fixture> {
    vec![
        Fixture::new(
            "epics_errlog-major",
            "epics_errlog",
            ERRLOG_MAJOR,
            Expectation::new()
                .field("log.iocname", "VonHamos01")
                .field("log.severity", "major")
                .field("log.message", "error log! IOC startup"),
        ),
        Fixture::new(
            "epics_errlog-fatal",
            "epics_errlog",
            "IOC=VonHamos01 sevr=fatal fatal error message",
            Expectation::new()
                .field("log.iocname", "VonHamos01")
                .field("log.severity", "fatal")
                .field("log.message", "fatal error message"),
        ),
        Fixture::new(
            "caputlog_basic",
            "caputlog",
            "IOC=VonHamos01 03-Jun-20 17:03:29 ctl-logdev01 klauer CAPUTLOGTEST:VALUE new=0 old=1 min=0 max=1",
            Expectation::new()
                .field("log.iocname", "VonHamos01")
                .field("log.pvname", "CAPUTLOGTEST:VALUE")
                .field("log.new_value", "0")
                .field("log.old_value", "1")
                .field("log.min_value", "0")
                .field("log.max_value", "1")
                .field("log.client_username", "klauer")
                .field("log.client_hostname", "ctl-logdev01")
                .field("log.timestamp", "2020-06-03T17:03:29.000Z"),
        ),
        Fixture::new(
            "caputlog_no_minmax",
            "caputlog",
            "IOC=VonHamos01 03-Jun-20 17:03:29 ctl-logdev01 klauer CAPUTLOGTEST:NEWVALUE new=0 old=1",
            Expectation::new()
                .field("log.iocname", "VonHamos01")
                .field("log.pvname", "CAPUTLOGTEST:NEWVALUE")
                .field("log.new_value", "0")
                .field("log.old_value", "1")
                .field("log.client_username", "klauer")
                .field("log.client_hostname", "ctl-logdev01")
                .field("log.timestamp", "2020-06-03T17:03:29.000Z"),
        ),
        Fixture::new(
            "caputlog_no_minmax_no_ioc",
            "caputlog",
            "03-Jun-20 17:03:29 ctl-logdev01 klauer CAPUTLOGTEST:NEWVALUE new=0 old=1",
            Expectation::new()
                .field("log.pvname", "CAPUTLOGTEST:NEWVALUE")
                .field("log.new_value", "0")
                .field("log.old_value", "1")
                .field("log.client_username", "klauer")
                .field("log.client_hostname", "ctl-logdev01")
                .field("log.timestamp", "2020-06-03T17:03:29.000Z"),
        ),
        Fixture::new(
            "caputlog_enum",
            "caputlog",
            "IOC=ioc-tc-mot-example 07-Jul-21 10:10:37 pscag06 root PLC:TST:MOT:SIM:01.SET new=Use old=Set",
            Expectation::new()
                .field("log.iocname", "ioc-tc-mot-example")
                .field("log.pvname", "PLC:TST:MOT:SIM:01.SET")
                .field("log.new_value", "Use")
                .field("log.old_value", "Set")
                .field("log.client_username", "root")
                .field("log.client_hostname", "pscag06")
                .field("log.timestamp", "2021-07-07T10:10:37.000Z"),
        ),
        Fixture::new(
            "plc_vacuum",
            "plc",
            r#"{"schema":"twincat-event-0","ts":1591288839.5965443,"plc":"PLC-LFE-VAC","severity":4,"id":0,"event_class":"97CF8247-B59C-4E2C-B4B0-7350D0471457","msg":"Critical (Pump time out.)","source":"plc_lfe_vac.plc_lfe_vac.GVL_Devices.IM1L0_XTES_PIP_01.fbLogger/Vacuum","event_type":3,"json":"{}"}"#,
            Expectation::new()
                .field("log.event_class", "97CF8247-B59C-4E2C-B4B0-7350D0471457")
                .field("log.event_type", 3)
                .field("log.event_type_str", "message_sent")
                .field(
                    "log.function_block",
                    "plc_lfe_vac.plc_lfe_vac.GVL_Devices.IM1L0_XTES_PIP_01.fbLogger",
                )
                .field("log.id", 0)
                .field("log.json", json!({}))
                .field("log.msg", "Critical (Pump time out.)")
                .field("log.plc", "PLC-LFE-VAC")
                .field("log.schema", "twincat-event-0")
                .field("log.severity", 4)
                .field(
                    "log.source",
                    "plc_lfe_vac.plc_lfe_vac.GVL_Devices.IM1L0_XTES_PIP_01.fbLogger/Vacuum",
                )
                .field("log.subsystem", "Vacuum")
                // the pipeline still emits the misspelled field for older dashboards
                .field("log.subsytem", "Vacuum")
                .field("log.timestamp", "2020-06-04T16:40:39.596Z"),
        ),
        Fixture::new(
            "gateway_caputlog",
            "gateway_caputlog",
            "Nov 02 23:20:46 physics@opi15 XCS:USER:MCC:EPHOT:SET1 7351 old=7350",
            Expectation::new()
                .field("log.timestamp", "2022-11-02T23:20:46.000Z")
                .field("log.client_username", "physics")
                .field("log.client_hostname", "opi15")
                .field("log.pvname", "XCS:USER:MCC:EPHOT:SET1")
                .field("log.new_value", "7351")
                .field("log.old_value", "7350")
                // no path on the gateway input, so the template is left unexpanded
                .field("log.iocname", "%{[path]}-gateway"),
        ),
    ]
}

pub fn fail_fixtures() -> Vec<FailFixture> {
    vec![
        FailFixture {
            fixture: Fixture::new(
                "missing_key",
                "epics_errlog",
                ERRLOG_MAJOR,
                Expectation::new().field("log.MISSING_KEY", "VonHamos01"),
            ),
            expected_failure: MismatchKind::MissingKey,
        },
        FailFixture {
            fixture: Fixture::new(
                "bad_value",
                "epics_errlog",
                ERRLOG_MAJOR,
                Expectation::new().field("log.iocname", "BAD_VALUE"),
            ),
            expected_failure: MismatchKind::BadValue,
        },
    ]
}
