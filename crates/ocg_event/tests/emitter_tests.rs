//! Integration tests for ocg_event

use ocg_core::testing::{Journal, MockCore};
use ocg_core::{DuelId, Method, OcgBuffer, OcgCore, OcgError};
use ocg_event::*;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Emitter whose listeners write into the core's journal
fn journaled(core: MockCore) -> (OcgCoreEmitter<MockCore>, Journal) {
    let journal = core.journal();
    let emitter = OcgCoreEmitter::new(core);

    let j = Arc::clone(&journal);
    emitter.on_before_call(move |e| j.lock().push(format!("before:call:{}", e.method)));
    let j = Arc::clone(&journal);
    emitter.on_after_call(move |e| j.lock().push(format!("after:call:{}", e.method())));
    let j = Arc::clone(&journal);
    emitter.on_error(move |e| j.lock().push(format!("error:{}", e.method())));

    for method in Method::ALL {
        let j = Arc::clone(&journal);
        emitter.on_before_method(method, move |e| j.lock().push(format!("before:{}", e.method)));
        let j = Arc::clone(&journal);
        emitter.on_after_method(method, move |e| j.lock().push(format!("after:{}", e.method())));
        let j = Arc::clone(&journal);
        emitter.on_error_method(method, move |e| {
            j.lock().push(format!("error:{}:{}", e.method(), e.error))
        });
    }

    (emitter, journal)
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().clone()
}

#[test]
fn test_success_sequence() {
    let (emitter, journal) = journaled(MockCore::new());

    let duel = emitter.create_duel(7).unwrap();
    emitter.end_duel(duel).unwrap();

    assert_eq!(
        entries(&journal),
        vec![
            "before:call:create_duel",
            "before:create_duel",
            "call:create_duel",
            "after:call:create_duel",
            "after:create_duel",
            "before:call:end_duel",
            "before:end_duel",
            "call:end_duel",
            "after:call:end_duel",
            "after:end_duel",
        ]
    );
}

#[test]
fn test_error_sequence() {
    let (emitter, journal) = journaled(MockCore::new().failing(Method::StartDuel));

    let duel = emitter.create_duel(7).unwrap();
    journal.lock().clear();

    let err = emitter.start_duel(&duel, 0).unwrap_err();
    assert!(matches!(err, OcgError::FfiCallFailed(ref m) if m == "start_duel failed"));

    assert_eq!(
        entries(&journal),
        vec![
            "before:call:start_duel",
            "before:start_duel",
            "call:start_duel",
            "error:start_duel",
            "error:start_duel:FFI call failed: start_duel failed",
        ]
    );
}

#[test]
fn test_exactly_one_outcome_per_dispatch() {
    let core = MockCore::new()
        .failing(Method::SetResponseI)
        .with_process_script([0x10, 0x20]);
    let emitter = OcgCoreEmitter::new(core);

    let afters = Arc::new(AtomicUsize::new(0));
    let errors = Arc::new(AtomicUsize::new(0));
    let a = Arc::clone(&afters);
    let e = Arc::clone(&errors);
    emitter
        .on_after_call(move |_| {
            a.fetch_add(1, Ordering::SeqCst);
        })
        .on_error(move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        });

    let duel = emitter.create_duel(1).unwrap();
    let mut buffer = OcgBuffer::new();
    emitter.process(&duel).unwrap();
    emitter.get_message(&duel, &mut buffer).unwrap();
    assert!(emitter.set_responsei(&duel, 1).is_err());
    emitter.process(&duel).unwrap();
    assert!(emitter.set_responsei(&duel, 2).is_err());
    emitter.end_duel(duel).unwrap();

    // 7 dispatches: 5 succeeded, 2 failed
    assert_eq!(afters.load(Ordering::SeqCst), 5);
    assert_eq!(errors.load(Ordering::SeqCst), 2);
}

#[test]
fn test_after_listener_sees_returned_value() {
    let emitter = OcgCoreEmitter::new(MockCore::new());

    let seen: Arc<Mutex<Option<DuelId>>> = Arc::new(Mutex::new(None));
    let s = Arc::clone(&seen);
    emitter.on_after_method(Method::CreateDuel, move |event| {
        let duel = event
            .result_as::<ocg_core::DuelHandle>()
            .expect("create_duel yields a duel handle");
        *s.lock() = Some(duel.id());
    });

    let duel = emitter.create_duel(99).unwrap();
    assert_eq!(*seen.lock(), Some(duel.id()));
}

#[test]
fn test_error_listener_sees_returned_error() {
    let emitter = OcgCoreEmitter::new(MockCore::new().failing(Method::Process));

    let seen = Arc::new(Mutex::new(String::new()));
    let s = Arc::clone(&seen);
    emitter.on_error(move |event| {
        *s.lock() = format!("{:?}", event.error);
    });

    let duel = emitter.create_duel(1).unwrap();
    let err = emitter.process(&duel).unwrap_err();
    assert_eq!(*seen.lock(), format!("{:?}", err));
}

#[test]
fn test_before_event_records_arguments() {
    let emitter = OcgCoreEmitter::new(MockCore::new());

    let events = Arc::new(Mutex::new(Vec::new()));
    let ev = Arc::clone(&events);
    emitter.on_before_call(move |event| ev.lock().push(event.clone()));

    let duel = emitter.create_duel(12345).unwrap();
    let mut buffer = OcgBuffer::new();
    emitter.new_card(&duel, 89631139, 0, 0, 0x01, 0, 0x0a).unwrap();
    emitter
        .query_card(&duel, 1, 0x04, 2, 0x81fff, &mut buffer, 0)
        .unwrap();
    emitter.preload_script(&duel, "./script/c1.lua", 0).unwrap();

    let events = events.lock();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].args, vec![CallArg::U32(12345)]);
    assert_eq!(
        events[1].args,
        vec![
            CallArg::Duel(duel.id()),
            CallArg::U32(89631139),
            CallArg::U8(0),
            CallArg::U8(0),
            CallArg::U8(0x01),
            CallArg::U8(0),
            CallArg::U8(0x0a),
        ]
    );
    assert_eq!(
        events[2].args[5],
        CallArg::OutBuffer(OcgBuffer::CAPACITY)
    );
    assert_eq!(events[3].args[1], CallArg::Text("./script/c1.lua".to_string()));
    assert!(events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn test_input_buffer_contents_reach_listeners() {
    let emitter = OcgCoreEmitter::new(MockCore::new());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    emitter.on_before_method(Method::CreateDuelV2, move |event| {
        s.lock().push(event.args.clone())
    });
    let s = Arc::clone(&seen);
    emitter.on_before_method(Method::SetResponseB, move |event| {
        s.lock().push(event.args.clone())
    });

    let seeds = OcgBuffer::from_seeds(&[12345, 67890]).unwrap();
    let duel = emitter.create_duel_v2(&seeds).unwrap();
    let response = OcgBuffer::from_bytes(&[2, 0, 1]).unwrap();
    emitter.set_responseb(&duel, &response).unwrap();

    let seen = seen.lock();
    assert_eq!(
        seen[0],
        vec![CallArg::InBuffer(ocg_core::create_seed_array(&[12345, 67890]))]
    );
    let CallArg::InBuffer(bytes) = &seen[0][0] else {
        panic!("expected an input buffer, got {:?}", seen[0][0]);
    };
    assert_eq!(ocg_core::read_seed_array(bytes, 2).unwrap(), vec![12345, 67890]);
    assert_eq!(seen[1][1], CallArg::InBuffer(vec![2, 0, 1]));
    assert_eq!(seen[1][1].to_string(), "in[02 00 01]");
}

#[test]
fn test_same_topic_listeners_run_in_registration_order() {
    let emitter = OcgCoreEmitter::new(MockCore::new());
    let order = Arc::new(Mutex::new(Vec::new()));

    for tag in ["first", "second", "third"] {
        let o = Arc::clone(&order);
        emitter.on_before_method(Method::CreateDuel, move |_| o.lock().push(tag));
    }

    emitter.create_duel(1).unwrap();
    assert_eq!(*order.lock(), vec!["first", "second", "third"]);
}

#[test]
fn test_same_listener_twice_runs_twice() {
    let emitter = OcgCoreEmitter::new(MockCore::new());
    let count = Arc::new(AtomicUsize::new(0));

    let c = Arc::clone(&count);
    let listener = Arc::new(move |_: &CallEvent| {
        c.fetch_add(1, Ordering::SeqCst);
    });
    let l1 = Arc::clone(&listener);
    let l2 = Arc::clone(&listener);
    emitter
        .on_before_call(move |e| (*l1)(e))
        .on_before_call(move |e| (*l2)(e));

    emitter.create_duel(1).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_scoped_listener_ignores_other_methods() {
    let emitter = OcgCoreEmitter::new(MockCore::new());
    let count = Arc::new(AtomicUsize::new(0));

    let c = Arc::clone(&count);
    emitter.on_after_method(Method::Process, move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    let duel = emitter.create_duel(1).unwrap();
    emitter.start_duel(&duel, 0).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);

    emitter.process(&duel).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_plain_member_access_emits_nothing() {
    let (emitter, journal) = journaled(MockCore::new());

    assert_eq!(emitter.inner().name, "mock-ocgcore");
    assert!(emitter.inner().calls().is_empty());
    assert!(entries(&journal).is_empty());
}

#[test]
fn test_panicking_before_listener_skips_the_call() {
    let emitter = OcgCoreEmitter::new(MockCore::new());
    let later = Arc::new(AtomicUsize::new(0));

    let l = Arc::clone(&later);
    emitter
        .on_before_method(Method::CreateDuel, |_| panic!("listener failure"))
        .on_before_method(Method::CreateDuel, move |_| {
            l.fetch_add(1, Ordering::SeqCst);
        });

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| emitter.create_duel(1)));
    assert!(outcome.is_err());
    assert_eq!(later.load(Ordering::SeqCst), 0);
    assert_eq!(emitter.inner().call_count(Method::CreateDuel), 0);

    // The registry is still usable afterwards
    emitter.registry().remove_all_listeners(Topic::Before(Method::CreateDuel));
    assert!(emitter.create_duel(2).is_ok());
    assert_eq!(emitter.inner().call_count(Method::CreateDuel), 1);
}

#[test]
fn test_listener_can_reenter_emitter() {
    let emitter = Arc::new(OcgCoreEmitter::new(MockCore::new()));
    let counts = Arc::new(Mutex::new(Vec::new()));

    let inner = Arc::clone(&emitter);
    let c = Arc::clone(&counts);
    emitter.on_after_method(Method::StartDuel, move |event| {
        // Listener registers a new listener from inside a dispatch
        let c2 = Arc::clone(&c);
        inner.on_after_method(Method::Process, move |e| c2.lock().push(e.method()));
        assert_eq!(event.method(), Method::StartDuel);
    });

    let duel = emitter.create_duel(1).unwrap();
    emitter.start_duel(&duel, 0).unwrap();
    emitter.process(&duel).unwrap();

    assert_eq!(*counts.lock(), vec![Method::Process]);
}

#[test]
fn test_every_method_is_intercepted() {
    let (emitter, journal) = journaled(MockCore::new());

    unsafe extern "C" fn script_reader(
        _name: *const std::ffi::c_char,
        _len: *mut std::ffi::c_int,
    ) -> *mut u8 {
        std::ptr::null_mut()
    }
    unsafe extern "C" fn card_reader(_code: u32, _data: *mut ocg_core::CardData) -> u32 {
        0
    }
    unsafe extern "C" fn message_handler(_duel: *mut std::ffi::c_void, _kind: u32) -> u32 {
        0
    }

    let mut buffer = OcgBuffer::new();
    let seeds = OcgBuffer::from_seeds(&[1, 2, 3]).unwrap();

    assert!(emitter.set_script_reader(script_reader).unwrap().is_null());
    emitter.set_card_reader(card_reader).unwrap();
    emitter.set_message_handler(message_handler).unwrap();
    let first = emitter.create_duel(1).unwrap();
    let duel = emitter.create_duel_v2(&seeds).unwrap();
    emitter.start_duel(&duel, 0).unwrap();
    emitter.set_player_info(&duel, 0, 8000, 5, 1).unwrap();
    emitter.get_log_message(&duel, &mut buffer).unwrap();
    emitter.get_message(&duel, &mut buffer).unwrap();
    emitter.process(&duel).unwrap();
    emitter.new_card(&duel, 1, 0, 0, 1, 0, 1).unwrap();
    emitter.new_tag_card(&duel, 1, 0, 1).unwrap();
    emitter.query_card(&duel, 0, 1, 0, 0, &mut buffer, 0).unwrap();
    emitter.query_field_count(&duel, 0, 1).unwrap();
    emitter.query_field_card(&duel, 0, 1, 0, &mut buffer, 0).unwrap();
    emitter.query_field_info(&duel, &mut buffer).unwrap();
    emitter.set_responsei(&duel, 0).unwrap();
    emitter.set_responseb(&duel, &buffer).unwrap();
    emitter.preload_script(&duel, "c1.lua", 0).unwrap();
    emitter.end_duel(first).unwrap();

    let log = entries(&journal);
    for method in Method::ALL {
        for prefix in ["before:call:", "before:", "call:", "after:call:", "after:"] {
            let entry = format!("{}{}", prefix, method);
            assert!(log.contains(&entry), "missing {}", entry);
        }
    }
}
