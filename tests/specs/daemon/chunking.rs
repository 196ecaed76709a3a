//! LIST chunking across datagrams.

use crate::prelude::*;
use appctl_core::CtlCommand;
use appctl_daemon::ControlRequest;

#[test]
fn list_of_25_apps_arrives_in_three_chunks() {
    let bed = TestBed::start();
    for i in 0..25 {
        bed.install(&format!("app{:02}", i));
    }

    let replies = bed.request_all(&ControlRequest::new(CtlCommand::List, ""));

    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0].code, 1);
    assert_eq!(replies[0].items.len(), 10);
    assert_eq!(replies[1].code, 1);
    assert_eq!(replies[1].items.len(), 10);
    assert_eq!(replies[2].code, 0);
    assert_eq!(replies[2].items.len(), 5);
    assert_eq!(replies[2].result, "Finish.");

    for reply in &replies {
        assert_eq!(reply.total, 25);
    }
    let names: Vec<String> = replies
        .iter()
        .flat_map(|r| r.items.iter().map(|i| i.name.clone()))
        .collect();
    assert_eq!(names.len(), 25);
    assert_eq!(names[0], "app00");
    assert_eq!(names[24], "app24");
}

#[test]
fn empty_list_is_a_single_final_chunk() {
    let bed = TestBed::start();

    let replies = bed.request_all(&ControlRequest::new(CtlCommand::List, ""));
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].code, 0);
    assert_eq!(replies[0].total, 0);
    assert_eq!(replies[0].result, "Finish.");
}
