//! Shared test doubles: a scripted connection replaying canned catalog
//! rows, and a connector that counts how often it is asked to connect.

use std::sync::{Arc, Mutex};

use strata_dialect::{Connection, ConnectionError, Connector, DriverConfig, Params, Row};

/// A connection replaying canned rows: the first responder whose needle
/// appears in the executed SQL wins. Every executed statement is logged.
pub struct FakeConnection {
    version: String,
    responders: Vec<(String, Vec<Row>)>,
    log: Arc<Mutex<Vec<String>>>,
}

impl Connection for FakeConnection {
    fn execute(&mut self, sql: &str, _params: Params<'_>) -> Result<Vec<Row>, ConnectionError> {
        self.log
            .lock()
            .expect("statement log poisoned")
            .push(String::from(sql));
        for (needle, rows) in &self.responders {
            if sql.contains(needle.as_str()) {
                return Ok(rows.clone());
            }
        }
        Ok(Vec::new())
    }

    fn version(&self) -> String {
        self.version.clone()
    }
}

/// Builds [`FakeConnection`]s and counts connection attempts.
pub struct FakeConnector {
    version: String,
    responders: Vec<(String, Vec<Row>)>,
    pub log: Arc<Mutex<Vec<String>>>,
    pub connects: Arc<Mutex<usize>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self {
            version: String::from("1.0"),
            responders: Vec::new(),
            log: Arc::new(Mutex::new(Vec::new())),
            connects: Arc::new(Mutex::new(0)),
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = String::from(version);
        self
    }

    /// Registers canned rows for statements containing `needle`.
    pub fn respond(mut self, needle: &str, rows: Vec<Row>) -> Self {
        self.responders.push((String::from(needle), rows));
        self
    }

    /// The statements executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.log.lock().expect("statement log poisoned").clone()
    }

    pub fn connect_count(&self) -> usize {
        *self.connects.lock().expect("connect counter poisoned")
    }
}

impl Connector for FakeConnector {
    fn connect(&self, _config: &DriverConfig) -> Result<Box<dyn Connection>, ConnectionError> {
        *self.connects.lock().expect("connect counter poisoned") += 1;
        Ok(Box::new(FakeConnection {
            version: self.version.clone(),
            responders: self.responders.clone(),
            log: Arc::clone(&self.log),
        }))
    }
}

/// A connector whose shared state outlives the driver that consumes it.
pub struct SharedConnector(pub Arc<FakeConnector>);

impl Connector for SharedConnector {
    fn connect(&self, config: &DriverConfig) -> Result<Box<dyn Connection>, ConnectionError> {
        self.0.connect(config)
    }
}
