use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use stratum_config::{Configurable, DefinitionError, Json, Node, Walker};

#[derive(Configurable, Default)]
struct Database {
    #[config("db-host,required")]
    host: String,
    #[config("db-port")]
    port: u16,
}

#[derive(Configurable, Default)]
struct Tls {
    #[config("tls-cert")]
    cert: Option<std::path::PathBuf>,
}

#[derive(Default, serde::Deserialize)]
struct Limits {
    burst: u32,
}

struct Runtime;

#[derive(Default)]
enum Mode {
    #[default]
    Fast,
}

impl Node for Mode {
    fn visit<'a>(&'a mut self, _walker: &mut Walker<'a>) -> Result<(), DefinitionError> {
        Ok(())
    }
}

#[derive(Configurable)]
struct Untagged {
    #[config("name")]
    name: String,
    labels: HashMap<String, String>,
    ordered: BTreeMap<String, u32>,
    tags: HashSet<String>,
    sorted: BTreeSet<u16>,
    queue: VecDeque<String>,
    shared: Arc<Database>,
    window: [u8; 4],
    started: Instant,
    mode: Mode,
    nested: Option<Database>,
}

#[derive(Configurable, Default)]
struct App {
    #[config("name")]
    name: String,
    #[config("timeout", backend = "env")]
    timeout: Duration,
    #[config("kind")]
    r#type: Option<String>,
    #[config("hosts")]
    hosts: Vec<String>,
    #[config("limits")]
    limits: Json<Limits>,
    database: Database,
    tls: Option<Tls>,
    boxed: Box<Database>,
    #[config("-")]
    cache: Option<Runtime>,
    #[config(skip)]
    runtime: Option<Runtime>,
}

fn main() {
    let mut app = App::default();
    let fields = Walker::walk(&mut app).unwrap();

    let paths: Vec<&str> = fields.iter().map(|field| field.path()).collect();
    assert_eq!(
        paths,
        [
            "name",
            "timeout",
            "type",
            "hosts",
            "limits",
            "database.host",
            "database.port",
            "boxed.host",
            "boxed.port",
        ]
    );
    assert_eq!(fields[1].backend(), Some("env"));
    drop(fields);

    assert!(app.tls.is_none());
    assert!(app.cache.is_none());
    assert!(app.runtime.is_none());
    assert_eq!(app.limits.burst, 0);

    let mut untagged = Untagged {
        name: String::new(),
        labels: HashMap::from([("team".to_string(), "core".to_string())]),
        ordered: BTreeMap::new(),
        tags: HashSet::new(),
        sorted: BTreeSet::new(),
        queue: VecDeque::new(),
        shared: Arc::new(Database::default()),
        window: [0; 4],
        started: Instant::now(),
        mode: Mode::default(),
        nested: Some(Database::default()),
    };
    let fields = Walker::walk(&mut untagged).unwrap();

    let paths: Vec<&str> = fields.iter().map(|field| field.path()).collect();
    assert_eq!(paths, ["name", "nested.host", "nested.port"]);
    drop(fields);

    assert_eq!(untagged.labels["team"], "core");
    assert!(matches!(untagged.mode, Mode::Fast));
}
