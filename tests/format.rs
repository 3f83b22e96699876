use json_log_line::{ExceptionInfo, Extras, JsonFormatter, Level, Record};
use serde_json::Value;

fn parsed(line: &str) -> serde_json::Map<String, Value> {
    match serde_json::from_str(line).expect("output must parse back as JSON") {
        Value::Object(map) => map,
        other => panic!("expected a json object, got {other}"),
    }
}

#[test]
fn sign_up_scenario() {
    let record = Record::new(Level::Info, "Sign up").with_extra("referral_code", "52d6ce");
    let line = JsonFormatter::new().format(&record).unwrap();

    assert!(!line.ends_with('\n'));
    let map = parsed(&line);
    assert_eq!(map.len(), 3);
    assert_eq!(map["message"], "Sign up");
    assert_eq!(map["referral_code"], "52d6ce");
    assert!(map["time"].is_string());
}

#[test]
fn extras_round_trip_unchanged() {
    let mut extras = Extras::new();
    extras.insert("first_name".into(), "bob".into());
    extras.insert("amount".into(), 0.00497265.into());
    extras.insert("context".into(), serde_json::json!({"tags": ["fizz", "bazz"]}));
    extras.insert("ok".into(), true.into());
    extras.insert("none".into(), Value::Null);

    let record = Record::new(Level::Error, "Payment was sent").with_extras(extras.clone());
    let map = parsed(&JsonFormatter::new().format(&record).unwrap());

    for (key, value) in &extras {
        assert_eq!(&map[key], value, "extra {key} must survive unchanged");
    }
    assert_eq!(map["message"], "Payment was sent");
    assert!(map.contains_key("time"));
    assert_eq!(map.len(), extras.len() + 2);
}

#[test]
fn message_always_wins_over_extras() {
    let record = Record::new(Level::Info, "Sign up").with_extra("message", "forged");
    let map = parsed(&JsonFormatter::new().format(&record).unwrap());
    assert_eq!(map["message"], "Sign up");
}

#[test]
fn caller_time_is_not_mutated() {
    let record = Record::new(Level::Info, "Sign up").with_extra("time", "2015-09-01T06:09:42");
    let map = parsed(&JsonFormatter::new().format(&record).unwrap());
    assert_eq!(map["time"], "2015-09-01T06:09:42");
}

#[test]
fn default_time_is_iso8601_with_microseconds() {
    let map = parsed(
        &JsonFormatter::new()
            .format(&Record::new(Level::Info, "Sign up"))
            .unwrap(),
    );
    let time = map["time"].as_str().unwrap();
    // 2015-09-01T06:09:42.797203 — no timezone suffix.
    assert_eq!(time.len(), 26);
    assert_eq!(&time[4..5], "-");
    assert_eq!(&time[10..11], "T");
    assert_eq!(&time[19..20], ".");
    assert!(time[20..].chars().all(|c| c.is_ascii_digit()));
    assert!(chrono::NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S%.6f").is_ok());
}

#[test]
fn formatter_does_not_mutate_caller_extras() {
    let record = Record::new(Level::Info, "Sign up").with_extra("fizz", "bazz");
    let before = record.extras.clone();
    JsonFormatter::new().format(&record).unwrap();
    assert_eq!(record.extras, before);
}

#[test]
fn verbose_variant_emits_every_builtin_key() {
    let record = Record::new(Level::Error, "An error has occured")
        .with_target("my_verbose_json")
        .with_module_path("tests")
        .with_source("/home/bob/project/tests.rs", 276)
        .with_function("verbose_variant_emits_every_builtin_key");
    let map = parsed(&JsonFormatter::verbose().format(&record).unwrap());

    for key in [
        "filename",
        "funcName",
        "levelname",
        "lineno",
        "module",
        "name",
        "pathname",
        "process",
        "processName",
        "stack_info",
        "thread",
        "threadName",
    ] {
        assert!(map.contains_key(key), "missing builtin key {key}");
    }
    assert_eq!(map["filename"], "tests.rs");
    assert_eq!(map["pathname"], "/home/bob/project/tests.rs");
    assert_eq!(map["levelname"], "ERROR");
    assert_eq!(map["lineno"], 276);
    assert_eq!(map["module"], "tests");
    assert_eq!(map["name"], "my_verbose_json");
    assert_eq!(map["funcName"], "verbose_variant_emits_every_builtin_key");
    assert_eq!(map["process"], std::process::id());
    assert_eq!(map["stack_info"], Value::Null);
}

#[test]
fn verbose_builtins_are_present_with_empty_extras() {
    let map = parsed(
        &JsonFormatter::verbose()
            .format(&Record::new(Level::Info, "hi"))
            .unwrap(),
    );
    assert!(map.contains_key("thread"));
    assert!(map.contains_key("threadName"));
    assert_eq!(map["message"], "hi");
}

#[test]
fn exception_scenario() {
    #[derive(Debug)]
    struct ValueError;

    impl std::fmt::Display for ValueError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("something wrong")
        }
    }

    impl std::error::Error for ValueError {}

    let record = Record::new(Level::Error, "Request failed")
        .with_exception(ExceptionInfo::from_error(&ValueError));
    let map = parsed(&JsonFormatter::new().format(&record).unwrap());

    assert_eq!(map["message"], "Request failed");
    assert!(map.contains_key("time"));
    let exc_info = map["exc_info"].as_str().unwrap();
    assert!(exc_info.contains("ValueError"));
    assert!(exc_info.contains("something wrong"));
}

#[test]
fn exc_info_overwrites_the_extras_key() {
    let record = Record::new(Level::Error, "Request failed")
        .with_extra("exc_info", "forged")
        .with_exception(ExceptionInfo::new("IoError", "broken pipe"));
    let map = parsed(&JsonFormatter::new().format(&record).unwrap());
    assert_eq!(map["exc_info"], "IoError: broken pipe");
}

#[test]
fn custom_serializer_changes_the_encoding() {
    use std::error::Error;

    let formatter = JsonFormatter::new().with_serializer(
        |record: &json_log_line::JsonRecord| -> Result<String, Box<dyn Error + Send + Sync>> {
            // Key-order-insensitive stub backend: keys only.
            let keys: Vec<&str> = record.keys().map(String::as_str).collect();
            Ok(keys.join(","))
        },
    );
    let line = formatter
        .format(&Record::new(Level::Info, "Sign up").with_extra("a", 1))
        .unwrap();
    assert_eq!(line, "a,message,time");
}

#[cfg(feature = "tracing")]
mod tracing_events {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;

    struct Capture(Arc<Mutex<Vec<Record>>>);

    impl<S> Layer<S> for Capture
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().unwrap().push(Record::from_event(event));
        }
    }

    #[test]
    fn record_from_event_carries_message_level_and_extras() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(Capture(Arc::clone(&captured)));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(life = 42, ok = true, "Hello, world!");
        });

        let records = captured.lock().unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.message, "Hello, world!");
        assert_eq!(record.level, Level::Info);
        assert_eq!(record.target, module_path!());
        assert_eq!(record.extras["life"], 42);
        assert_eq!(record.extras["ok"], true);

        let map = parsed(&JsonFormatter::new().format(record).unwrap());
        assert_eq!(map["message"], "Hello, world!");
        assert_eq!(map["life"], 42);
    }
}
