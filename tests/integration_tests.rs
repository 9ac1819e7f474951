use serde::{Deserialize, Serialize};
use serde_environ::{
    from_entries, from_entries_with_prefix, from_store, to_map, to_store, to_vec,
    to_vec_with_prefix, EnvOptions, EnvStore, Error, MemoryEnv,
};
use std::collections::{BTreeMap, HashMap};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Address {
    #[serde(rename = "type")]
    kind: u8,
    street: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Record {
    a: String,
    b: i32,
    s: Vec<Option<String>>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct KitchenSink {
    name: String,
    age: u8,
    list: Vec<i32>,
    fruits: Vec<String>,
    addr: Vec<Address>,
    rec_ptr: Option<Record>,
    port_name: HashMap<u16, String>,
    arr_list: Vec<Vec<String>>,
}

const KITCHEN_SINK_ENV: &[&str] = &[
    "NAME=Lufy",
    "AGE=66",
    "LIST=34,65,234,653,3",
    "FRUITS=banana,apple,lemon,whatever",
    "ADDR.0.TYPE=1",
    "ADDR.0.STREET=Somewhere str. over the rainbow",
    "ADDR.1.TYPE=0",
    "ADDR.1.STREET=Somewhereelse str. over.",
    "REC_PTR.A=ValA",
    "REC_PTR.B=-1002",
    "REC_PTR.S=this,is,a,ptr,list",
    "PORT_NAME.80=http",
    "PORT_NAME.443=https",
    "PORT_NAME.25=smtp",
    "ARR_LIST.0=list,of,strings",
    "ARR_LIST.1=once,upon,\"a time, comma\",omg",
    "ARR_LIST.2=red,green,blue",
];

fn sorted(mut entries: Vec<String>) -> Vec<String> {
    entries.sort();
    entries
}

#[test]
fn test_kitchen_sink_decode() {
    let sink: KitchenSink = from_entries(KITCHEN_SINK_ENV).unwrap();

    assert_eq!(sink.name, "Lufy");
    assert_eq!(sink.age, 66);
    assert_eq!(sink.list, vec![34, 65, 234, 653, 3]);
    assert_eq!(sink.fruits, vec!["banana", "apple", "lemon", "whatever"]);
    assert_eq!(
        sink.addr,
        vec![
            Address {
                kind: 1,
                street: "Somewhere str. over the rainbow".to_string(),
            },
            Address {
                kind: 0,
                street: "Somewhereelse str. over.".to_string(),
            },
        ]
    );

    let rec = sink.rec_ptr.as_ref().unwrap();
    assert_eq!(rec.a, "ValA");
    assert_eq!(rec.b, -1002);
    assert_eq!(
        rec.s,
        ["this", "is", "a", "ptr", "list"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect::<Vec<_>>()
    );

    let ports: HashMap<u16, String> = [(80, "http"), (443, "https"), (25, "smtp")]
        .into_iter()
        .map(|(port, name)| (port, name.to_string()))
        .collect();
    assert_eq!(sink.port_name, ports);

    assert_eq!(
        sink.arr_list,
        vec![
            vec!["list", "of", "strings"],
            vec!["once", "upon", "a time, comma", "omg"],
            vec!["red", "green", "blue"],
        ]
    );
}

#[test]
fn test_kitchen_sink_reencodes_to_same_entries() {
    let sink: KitchenSink = from_entries(KITCHEN_SINK_ENV).unwrap();
    let entries = to_vec(&sink).unwrap();

    let expected: Vec<String> = KITCHEN_SINK_ENV.iter().map(|s| s.to_string()).collect();
    assert_eq!(sorted(entries), sorted(expected));
}

#[test]
fn test_lufy_round_trip() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Person {
        name: String,
        age: u8,
    }

    let person: Person = from_entries(["NAME=Lufy", "AGE=66"]).unwrap();
    assert_eq!(
        person,
        Person {
            name: "Lufy".to_string(),
            age: 66,
        }
    );
    assert_eq!(
        sorted(to_vec(&person).unwrap()),
        vec!["AGE=66".to_string(), "NAME=Lufy".to_string()]
    );
}

#[test]
fn test_prefix_isolation() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Conf {
        addr: String,
        port: i32,
    }

    let conf = Conf {
        addr: "someOtherHost.net".to_string(),
        port: 8090,
    };
    let entries = to_vec_with_prefix(&conf, "__PFX__").unwrap();
    assert_eq!(entries, vec!["__PFX__ADDR=someOtherHost.net", "__PFX__PORT=8090"]);

    let mut mixed = entries.clone();
    mixed.push("ADDR=wrong".to_string());
    mixed.push("PORT=1".to_string());
    let back: Conf = from_entries_with_prefix(mixed, "__PFX__").unwrap();
    assert_eq!(back, conf);
}

#[test]
fn test_boolean_is_true_only_for_true() {
    #[derive(Deserialize)]
    struct Flags {
        a: bool,
        b: bool,
        c: bool,
        d: bool,
        e: bool,
    }

    let flags: Flags = from_entries(["A=true", "B=TRUE", "C=True", "D=1", "E=yes"]).unwrap();
    assert!(flags.a && flags.b && flags.c);
    assert!(!flags.d);
    assert!(!flags.e);
}

#[test]
fn test_embedded_comma_survives_round_trip() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Notes {
        items: Vec<String>,
    }

    let notes = Notes {
        items: vec!["a time, comma".to_string(), "say \"hi\"".to_string(), "plain".to_string()],
    };
    let entries = to_vec(&notes).unwrap();
    assert_eq!(entries, vec![r#"ITEMS="a time, comma","say ""hi""",plain"#]);
    assert_eq!(from_entries::<Notes, _, _>(&entries).unwrap(), notes);
}

#[test]
fn test_single_empty_string_is_distinct_from_empty_list() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Lists {
        one: Vec<String>,
        none: Vec<String>,
    }

    let lists = Lists {
        one: vec![String::new()],
        none: Vec::new(),
    };
    let entries = to_vec(&lists).unwrap();
    assert_eq!(entries, vec!["ONE=\"\"", "NONE="]);
    assert_eq!(from_entries::<Lists, _, _>(&entries).unwrap(), lists);
}

#[test]
fn test_indexed_sequence_gap_truncates() {
    #[derive(Deserialize, Debug)]
    struct Item {
        name: String,
    }

    #[derive(Deserialize, Debug)]
    struct Items {
        items: Vec<Item>,
    }

    let items: Items = from_entries(["ITEMS.0.NAME=a", "ITEMS.2.NAME=c"]).unwrap();
    assert_eq!(items.items.len(), 1);
    assert_eq!(items.items[0].name, "a");
}

#[test]
fn test_dynamic_values_follow_key_layout() {
    #[derive(Deserialize)]
    struct Conf {
        extra: serde_json::Value,
        missing: serde_json::Value,
    }

    let conf: Conf = from_entries(["EXTRA.A=1", "EXTRA.B.C=x"]).unwrap();
    assert_eq!(conf.extra, serde_json::json!({"A": "1", "B": {"C": "x"}}));
    assert_eq!(conf.missing, serde_json::Value::Null);
}

#[test]
fn test_map_root() {
    let ports: BTreeMap<String, u16> = from_entries(["HTTP=80", "HTTPS=443"]).unwrap();
    assert_eq!(ports["HTTP"], 80);
    assert_eq!(ports["HTTPS"], 443);

    let map = to_map(&ports).unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["HTTP", "HTTPS"]);
}

#[test]
fn test_error_reports_key_and_value() {
    #[derive(Deserialize, Debug)]
    struct Conf {
        #[allow(dead_code)]
        port: u16,
    }

    let err = from_entries::<Conf, _, _>(["PORT=eighty"]).unwrap_err();
    match err {
        Error::IntegerParse { key, value, .. } => {
            assert_eq!(key, "PORT");
            assert_eq!(value, "eighty");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_store_consumption_leaves_unread_keys() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Db {
        host: String,
        port: u16,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Conf {
        db: Db,
        tags: Vec<String>,
    }

    let conf = Conf {
        db: Db {
            host: "db.internal".to_string(),
            port: 5432,
        },
        tags: vec!["a".to_string(), "b".to_string()],
    };

    let mut env = MemoryEnv::from_entries(["PATH=/usr/bin", "APP_UNUSED=1"]);
    let options = EnvOptions::new().with_prefix("APP_");
    to_store(&conf, &mut env, &options).unwrap();
    assert_eq!(env.get("APP_DB.HOST"), Some("db.internal"));
    assert_eq!(env.get("APP_TAGS"), Some("a,b"));

    let kept: Conf = from_store(&mut env, &options).unwrap();
    assert_eq!(kept, conf);
    assert_eq!(env.len(), 5);

    let back: Conf = from_store(&mut env, &options.with_unset_consumed(true)).unwrap();
    assert_eq!(back, conf);
    assert_eq!(
        env.list(),
        vec!["PATH=/usr/bin".to_string(), "APP_UNUSED=1".to_string()]
    );
}

#[test]
fn test_invalid_roots() {
    assert!(matches!(to_vec(&42), Err(Error::InvalidRootKind(_))));
    assert!(matches!(to_vec(&vec![1, 2]), Err(Error::InvalidRootKind(_))));
    assert!(matches!(
        from_entries::<Vec<String>, _, _>(["A=1"]),
        Err(Error::InvalidRootKind(_))
    ));
}

#[test]
fn test_internal_fields_are_never_transcoded() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Session {
        user: String,
        _token: String,
        _retries: u8,
    }

    let session = Session {
        user: "lufy".to_string(),
        _token: "secret".to_string(),
        _retries: 3,
    };
    assert_eq!(to_vec(&session).unwrap(), vec!["USER=lufy"]);

    let back: Session = from_entries(["USER=lufy", "_TOKEN=leaked", "_RETRIES=9"]).unwrap();
    assert_eq!(
        back,
        Session {
            user: "lufy".to_string(),
            _token: String::new(),
            _retries: 0,
        }
    );
}

#[test]
fn test_dotted_map_keys_fail_instead_of_inventing_entries() {
    let mut headers = BTreeMap::new();
    headers.insert("A.B".to_string(), "x".to_string());

    let entries = to_vec(&headers).unwrap();
    assert_eq!(entries, vec!["A.B=x"]);

    let err = from_entries::<BTreeMap<String, String>, _, _>(&entries).unwrap_err();
    assert!(matches!(err, Error::AmbiguousMapKey { ref key } if key == "A"));
}
