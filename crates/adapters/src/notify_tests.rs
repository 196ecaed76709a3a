// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn warning_wire_shape() {
    let warning = Warning {
        cid: "a1b2c3".to_string(),
        name: "foo".to_string(),
        kind: WarnKind::Cpu,
        value: 95,
        threshold: 90,
    };
    let json = serde_json::to_value(&warning).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "cid": "a1b2c3",
            "name": "foo",
            "kind": "cpu",
            "value": 95,
            "threshold": 90,
        })
    );
}

#[test]
fn delivers_one_datagram_per_warning() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver
        .set_read_timeout(Some(std::time::Duration::from_secs(2)))
        .unwrap();
    let target = receiver.local_addr().unwrap().to_string();

    let notifier = UdpWarnNotifier::new(&target);
    notifier.warn(&Warning {
        cid: "host".to_string(),
        name: "foo".to_string(),
        kind: WarnKind::Mem,
        value: 97,
        threshold: 90,
    });

    let mut buf = [0u8; 1024];
    let (size, _) = receiver.recv_from(&mut buf).unwrap();
    let received: Warning = serde_json::from_slice(&buf[..size]).unwrap();
    assert_eq!(received.kind, WarnKind::Mem);
    assert_eq!(received.value, 97);
}

#[test]
fn unreachable_target_does_not_panic() {
    // Reserved TEST-NET address; the send errors or vanishes, either is fine
    let notifier = UdpWarnNotifier::new("192.0.2.1:9");
    notifier.warn(&Warning {
        cid: String::new(),
        name: "foo".to_string(),
        kind: WarnKind::Cpu,
        value: 100,
        threshold: 90,
    });
}

#[test]
fn fake_notifier_collects() {
    let fake = FakeWarnNotifier::new();
    fake.warn(&Warning {
        cid: "c".to_string(),
        name: "n".to_string(),
        kind: WarnKind::Cpu,
        value: 91,
        threshold: 90,
    });
    assert_eq!(fake.sent().len(), 1);
    assert_eq!(fake.sent()[0].name, "n");
}
