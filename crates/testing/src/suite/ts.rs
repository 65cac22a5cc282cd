// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{sync::Arc, thread};

use edgekv_core::{Result, Tskv, TskvExt};

use crate::unique_table;

pub type Open<'a> = &'a dyn Fn(&str) -> Result<Arc<dyn Tskv>>;

pub fn run(open: impl Fn(&str) -> Result<Arc<dyn Tskv>>) {
	crate::init_tracing();
	let open: Open<'_> = &open;
	monotonic(open);
	get(open);
	last(open);
	delete(open);
	delete_before(open);
	restart(open);
	drop_table(open);
	empty_table(open);
	concurrent_set(open, 8, 50);
}

const SERIES: [(i64, &str); 4] = [(1000, "bar"), (1500, "bar1"), (2000, "bar2"), (3000, "bar3")];

fn seeded(open: Open<'_>, prefix: &str) -> (String, Arc<dyn Tskv>) {
	let table = unique_table(prefix);
	let ts = open(&table).unwrap();
	for (key, value) in SERIES {
		assert!(ts.set_value(key, &value.to_string()).unwrap(), "set {key}");
	}
	(table, ts)
}

pub fn monotonic(open: Open<'_>) {
	let (_, ts) = seeded(open, "ts_mono");

	assert!(!ts.set_value(2500, &"bar25".to_string()).unwrap());
	assert!(!ts.set_value(3000, &"dup".to_string()).unwrap());
	assert_eq!(ts.get_value::<String>(2500).unwrap(), None);

	let (key, value) = ts.last_value::<String>().unwrap();
	assert_eq!(key, 3000);
	assert_eq!(value.as_deref(), Some("bar3"));
}

pub fn get(open: Open<'_>) {
	let (_, ts) = seeded(open, "ts_get");
	for (key, value) in SERIES {
		assert_eq!(ts.get_value::<String>(key).unwrap().as_deref(), Some(value));
	}
	assert_eq!(ts.get(1001).unwrap(), None);
	assert_eq!(ts.get_value::<i64>(1000).unwrap_err().code(), "ENC_003");
}

pub fn last(open: Open<'_>) {
	let (_, ts) = seeded(open, "ts_last");
	assert!(ts.set_value(3500, &"bar4".to_string()).unwrap());
	let (key, value) = ts.last_value::<String>().unwrap();
	assert_eq!((key, value.as_deref()), (3500, Some("bar4")));
}

pub fn delete(open: Open<'_>) {
	let (_, ts) = seeded(open, "ts_delete");
	ts.delete(3000).unwrap();
	assert_eq!(ts.get(3000).unwrap(), None);
	assert_eq!(ts.get_value::<String>(2000).unwrap().as_deref(), Some("bar2"));

	// the last key is not rewound
	assert_eq!(ts.last().unwrap(), (3000, None));
	assert!(!ts.set_value(3000, &"again".to_string()).unwrap());
	assert!(ts.set_value(3001, &"next".to_string()).unwrap());

	ts.delete(42).unwrap();
}

pub fn delete_before(open: Open<'_>) {
	let (_, ts) = seeded(open, "ts_before");
	assert!(ts.set_value(3500, &"bar4".to_string()).unwrap());

	ts.delete_before(3000).unwrap();
	for key in [1000, 1500, 2000] {
		assert_eq!(ts.get(key).unwrap(), None, "{key} should be deleted");
	}
	assert_eq!(ts.get_value::<String>(3000).unwrap().as_deref(), Some("bar3"));
	assert_eq!(ts.get_value::<String>(3500).unwrap().as_deref(), Some("bar4"));
}

pub fn restart(open: Open<'_>) {
	let (table, ts) = seeded(open, "ts_restart");
	ts.close().unwrap();

	let reopened = open(&table).unwrap();
	let (key, value) = reopened.last_value::<String>().unwrap();
	assert_eq!((key, value.as_deref()), (3000, Some("bar3")));
	assert!(!reopened.set_value(2999, &"late".to_string()).unwrap());
	assert!(reopened.set_value(3001, &"bar4".to_string()).unwrap());
}

pub fn drop_table(open: Open<'_>) {
	let (table, ts) = seeded(open, "ts_drop");
	ts.drop_table().unwrap();
	for (key, _) in SERIES {
		assert_eq!(ts.get(key).unwrap(), None);
	}

	let reopened = open(&table).unwrap();
	assert_eq!(reopened.last().unwrap(), (0, None));
}

pub fn empty_table(open: Open<'_>) {
	let ts = open(&unique_table("ts_empty")).unwrap();
	assert_eq!(ts.last().unwrap(), (0, None));
	assert!(!ts.set_value(0, &"zero".to_string()).unwrap());
	assert!(!ts.set_value(-1, &"negative".to_string()).unwrap());
	assert!(ts.set_value(1, &"one".to_string()).unwrap());
}

/// `threads` writers set interleaved keys; `last` ends at the largest key
/// any of them had accepted.
pub fn concurrent_set(open: Open<'_>, threads: i64, per_thread: i64) {
	let ts = open(&unique_table("ts_concurrent")).unwrap();
	let accepted: Vec<i64> = thread::scope(|s| {
		let handles: Vec<_> = (0..threads)
			.map(|t| {
				let ts = ts.clone();
				s.spawn(move || {
					let mut accepted = Vec::new();
					for i in 0..per_thread {
						let key = 1 + t + i * threads;
						if ts.set_value(key, &format!("v{key}")).unwrap() {
							accepted.push(key);
						}
					}
					accepted
				})
			})
			.collect();
		handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
	});

	let max = accepted.iter().copied().max().unwrap();
	assert_eq!(max, threads * per_thread);
	let (key, value) = ts.last_value::<String>().unwrap();
	assert_eq!(key, max);
	assert_eq!(value, Some(format!("v{max}")));
	for key in accepted {
		assert_eq!(ts.get_value::<String>(key).unwrap(), Some(format!("v{key}")));
	}
}
