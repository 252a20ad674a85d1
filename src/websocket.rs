/// WebSocket server: one table view per connection over shared datasets
use actix::prelude::*;
use actix_web_actors::ws;
use serde_json::Value as JsonValue;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::column::{Align, ColumnDef, ColumnSpec, ColumnValue, FilterOption};
use crate::config::TableConfig;
use crate::error::{Result, TableError};
use crate::messages::{ClientMessage, ServerMessage};
use crate::record::{identity_of, row_to_json, RowId};
use crate::table::DataTable;

/// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
/// How long before lack of client response causes a timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

pub type Row = HashMap<String, ColumnValue>;

/// A named row collection and the columns it is shown with
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, values: &[(&str, ColumnValue)]) {
        self.rows.push(
            values
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        );
    }
}

fn column(key: &str, label: &str) -> ColumnSpec {
    ColumnSpec::new(key, label)
}

fn options(values: &[&str]) -> Vec<FilterOption> {
    values
        .iter()
        .map(|v| FilterOption::new(*v, v.replace('_', " ")))
        .collect()
}

fn employees() -> Dataset {
    let mut department = column("department", "Department");
    department.filterable = true;
    department.filter_options = options(&["Engineering", "Finance", "Marketing", "People", "Sales"]);

    let mut status = column("status", "Status");
    status.filterable = true;
    status.filter_options = options(&["active", "on_leave", "inactive"]);

    let mut salary = column("salary", "Salary");
    salary.sortable = true;
    salary.align = Align::Right;

    let mut name = column("name", "Name");
    name.sortable = true;
    let mut hired = column("hire_date", "Hire Date");
    hired.sortable = true;

    let mut dataset = Dataset::new(
        "employees",
        vec![
            column("id", "Employee ID"),
            name,
            department,
            column("position", "Position"),
            status,
            hired,
            salary,
        ],
    );

    let staff: [(&str, &str, &str, &str, &str, &str, i32); 12] = [
        ("E-1001", "Amara Okafor", "Engineering", "Staff Engineer", "active", "2018-03-12", 142000),
        ("E-1002", "Bruno Costa", "Sales", "Account Executive", "active", "2020-07-01", 88000),
        ("E-1003", "Chen Wei", "Engineering", "Backend Engineer", "on_leave", "2021-01-18", 118000),
        ("E-1004", "Dana Kowalski", "People", "HR Partner", "active", "2019-11-04", 79000),
        ("E-1005", "Elif Yilmaz", "Finance", "Controller", "active", "2017-05-22", 131000),
        ("E-1006", "Farid Haddad", "Marketing", "Content Lead", "inactive", "2016-09-30", 74000),
        ("E-1007", "Grace Mensah", "Engineering", "Engineering Manager", "active", "2015-02-09", 165000),
        ("E-1008", "Hiro Tanaka", "Sales", "Sales Manager", "active", "2019-04-15", 112000),
        ("E-1009", "Ines Duarte", "Marketing", "Designer", "on_leave", "2022-08-08", 69000),
        ("E-1010", "Jonas Berg", "Engineering", "Frontend Engineer", "active", "2023-02-27", 104000),
        ("E-1011", "Kavya Rao", "Finance", "Analyst", "active", "2021-10-11", 76000),
        ("E-1012", "Liam O'Brien", "People", "Recruiter", "active", "2024-01-08", 64000),
    ];
    for (id, name, department, position, status, hired, salary) in staff {
        dataset.push(&[
            ("id", id.into()),
            ("name", name.into()),
            ("department", department.into()),
            ("position", position.into()),
            ("status", status.into()),
            ("hire_date", hired.into()),
            ("salary", ColumnValue::Int32(salary)),
        ]);
    }
    dataset
}

fn leave_requests() -> Dataset {
    let mut kind = column("leave_type", "Type");
    kind.filterable = true;
    kind.filter_options = options(&["annual", "sick", "parental", "unpaid"]);

    let mut status = column("status", "Status");
    status.filterable = true;
    status.filter_options = options(&["pending", "approved", "rejected"]);

    let mut start = column("start_date", "Start");
    start.sortable = true;
    let mut days = column("days", "Days");
    days.sortable = true;
    days.align = Align::Right;

    let mut dataset = Dataset::new(
        "leaves",
        vec![column("employee", "Employee"), kind, start, days, status],
    );

    let requests: [(&str, &str, &str, &str, i32, &str); 6] = [
        ("L-501", "Chen Wei", "parental", "2025-01-06", 60, "approved"),
        ("L-502", "Bruno Costa", "annual", "2025-02-17", 5, "pending"),
        ("L-503", "Ines Duarte", "sick", "2025-02-03", 14, "approved"),
        ("L-504", "Kavya Rao", "annual", "2025-03-24", 10, "pending"),
        ("L-505", "Farid Haddad", "unpaid", "2025-01-13", 30, "rejected"),
        ("L-506", "Dana Kowalski", "annual", "2025-04-07", 3, "pending"),
    ];
    for (id, employee, kind, start, days, status) in requests {
        dataset.push(&[
            ("id", id.into()),
            ("employee", employee.into()),
            ("leave_type", kind.into()),
            ("start_date", start.into()),
            ("days", ColumnValue::Int32(days)),
            ("status", status.into()),
        ]);
    }
    dataset
}

/// Shared state for all WebSocket connections
pub struct AppState {
    pub datasets: Arc<Mutex<HashMap<String, Dataset>>>,
    pub subscribers: Arc<Mutex<HashMap<String, Vec<Addr<TableWebSocket>>>>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// State seeded with the HR demo datasets
    pub fn new() -> Self {
        Self::with_datasets(vec![employees(), leave_requests()])
    }

    pub fn with_datasets(datasets: Vec<Dataset>) -> Self {
        Self {
            datasets: Arc::new(Mutex::new(
                datasets.into_iter().map(|d| (d.name.clone(), d)).collect(),
            )),
            subscribers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock_datasets(&self) -> std::sync::MutexGuard<'_, HashMap<String, Dataset>> {
        self.datasets.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of a dataset for a connection to build its view on
    pub fn snapshot(&self, name: &str) -> Result<Dataset> {
        self.lock_datasets()
            .get(name)
            .cloned()
            .ok_or_else(|| TableError::UnknownTable {
                name: name.to_string(),
            })
    }

    /// Append a JSON row to a dataset. Returns the dataset's new rows.
    pub fn insert_row(&self, name: &str, row: HashMap<String, JsonValue>) -> Result<Vec<Row>> {
        let converted = row
            .iter()
            .map(|(k, v)| ColumnValue::try_from_json(v).map(|cv| (k.clone(), cv)))
            .collect::<Result<Row>>()?;

        let mut datasets = self.lock_datasets();
        let dataset = datasets
            .get_mut(name)
            .ok_or_else(|| TableError::UnknownTable {
                name: name.to_string(),
            })?;
        dataset.rows.push(converted);
        log::info!("inserted row into '{}' ({} rows)", name, dataset.rows.len());
        Ok(dataset.rows.clone())
    }

    /// Remove the row with identity `id` from a dataset. Returns the dataset's new rows.
    pub fn delete_row(&self, name: &str, id: &RowId) -> Result<Vec<Row>> {
        let mut datasets = self.lock_datasets();
        let dataset = datasets
            .get_mut(name)
            .ok_or_else(|| TableError::UnknownTable {
                name: name.to_string(),
            })?;
        let position = dataset
            .rows
            .iter()
            .enumerate()
            .position(|(i, row)| identity_of(row, i) == *id)
            .ok_or_else(|| TableError::RowNotFound { id: id.clone() })?;
        dataset.rows.remove(position);
        log::info!("deleted row '{}' from '{}'", id, name);
        Ok(dataset.rows.clone())
    }

    /// Subscribe a WebSocket connection to a dataset
    pub fn subscribe(&self, name: &str, addr: Addr<TableWebSocket>) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.entry(name.to_string()).or_default().push(addr);
    }

    pub fn unsubscribe(&self, name: &str, addr: &Addr<TableWebSocket>) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(addrs) = subscribers.get_mut(name) {
            addrs.retain(|a| a != addr);
        }
    }

    /// Send a dataset's new rows to every connection viewing it
    pub fn broadcast(&self, name: &str, rows: Vec<Row>) {
        let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(addrs) = subscribers.get(name) {
            for addr in addrs {
                addr.do_send(DatasetChanged {
                    table_name: name.to_string(),
                    rows: rows.clone(),
                });
            }
        }
    }
}

/// Message to connections viewing a dataset that was modified
#[derive(Message)]
#[rtype(result = "()")]
struct DatasetChanged {
    table_name: String,
    rows: Vec<Row>,
}

/// One connection's table view. Callback output is queued and drained
/// after every client message.
pub struct TableSession {
    table_name: String,
    table: DataTable<Row>,
    outbox: Rc<RefCell<Vec<ServerMessage>>>,
}

impl TableSession {
    pub fn open(dataset: Dataset, config: TableConfig) -> Result<Self> {
        let outbox: Rc<RefCell<Vec<ServerMessage>>> = Rc::new(RefCell::new(Vec::new()));
        let columns: Vec<ColumnDef<Row>> = dataset.columns.iter().map(|c| c.to_column_def()).collect();

        let selections = outbox.clone();
        let clicks = outbox.clone();
        let exports = outbox.clone();
        let table = DataTable::from_rows(dataset.rows, columns, config)?
            .on_selection_change(move |rows: &[&Row]| {
                selections.borrow_mut().push(ServerMessage::SelectionChanged {
                    rows: rows.iter().map(|r| row_to_json(r)).collect(),
                });
            })
            .on_row_click(move |row: &Row| {
                clicks
                    .borrow_mut()
                    .push(ServerMessage::RowClicked { row: row_to_json(row) });
            })
            .on_export(move |rows: &[&Row], format| {
                exports.borrow_mut().push(ServerMessage::ExportReady {
                    format,
                    rows: rows.iter().map(|r| row_to_json(r)).collect(),
                });
            });

        Ok(Self {
            table_name: dataset.name,
            table,
            outbox,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn table(&self) -> &DataTable<Row> {
        &self.table
    }

    pub fn page_message(&self) -> ServerMessage {
        ServerMessage::Page {
            table_name: self.table_name.clone(),
            page: self.table.render(),
        }
    }

    fn drain(&self) -> Vec<ServerMessage> {
        self.outbox.borrow_mut().drain(..).collect()
    }

    /// Apply a view message. Returns the messages to send back, in order.
    pub fn handle(&mut self, msg: ClientMessage) -> Result<Vec<ServerMessage>> {
        let mut send_page = true;
        match msg {
            ClientMessage::Search { term } => self.table.set_search(term),
            ClientMessage::Filter { column, value } => self.table.set_filter(column, value),
            ClientMessage::Sort { column } => {
                self.table.toggle_sort(&column);
            }
            ClientMessage::SetPage { page } => self.table.set_page(page),
            ClientMessage::SetPageSize { page_size } => self.table.set_page_size(page_size),
            ClientMessage::SelectRow { row_id, checked } => {
                self.table.select_row(&row_id, checked)?;
            }
            ClientMessage::SelectAll { checked } => {
                self.table.select_all(checked);
            }
            ClientMessage::ClickRow { row_id } => {
                self.table.click_row(&row_id)?;
                send_page = false;
            }
            ClientMessage::Export { format } => {
                if !self.table.export(format) {
                    return Err(TableError::InvalidValue(format!(
                        "Export is disabled for '{}'",
                        self.table_name
                    )));
                }
                send_page = false;
            }
            ClientMessage::Open { .. }
            | ClientMessage::InsertRow { .. }
            | ClientMessage::DeleteRow { .. } => {
                return Err(TableError::InvalidValue(
                    "Dataset messages are not view messages".to_string(),
                ));
            }
        }

        let mut messages = self.drain();
        if send_page {
            messages.push(self.page_message());
        }
        Ok(messages)
    }

    /// Swap in a dataset's new rows, keeping the view state.
    pub fn refresh(&mut self, rows: Vec<Row>) -> Vec<ServerMessage> {
        self.table.set_rows(Rc::new(rows));
        let mut messages = self.drain();
        messages.push(self.page_message());
        messages
    }
}

/// Parse one text frame from a client.
pub fn decode_client_message(text: &str) -> Result<ClientMessage> {
    Ok(serde_json::from_str(text)?)
}

/// WebSocket connection actor
pub struct TableWebSocket {
    hb: Instant,
    state: actix_web::web::Data<AppState>,
    session: Option<TableSession>,
}

impl TableWebSocket {
    pub fn new(state: actix_web::web::Data<AppState>) -> Self {
        Self {
            hb: Instant::now(),
            state,
            session: None,
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                log::warn!("WebSocket client heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn send(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(text) => ctx.text(text),
            Err(e) => log::error!("failed to encode server message: {}", e),
        }
    }

    fn open(
        &mut self,
        table_name: &str,
        config: Option<TableConfig>,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Result<Vec<ServerMessage>> {
        let dataset = self.state.snapshot(table_name)?;
        let config = config.unwrap_or_else(|| TableConfig::default().selectable(true));
        let session = TableSession::open(dataset, config)?;

        if let Some(previous) = self.session.take() {
            self.state.unsubscribe(previous.table_name(), &ctx.address());
        }
        self.state.subscribe(table_name, ctx.address());
        log::debug!("connection opened '{}'", table_name);

        let page = session.page_message();
        self.session = Some(session);
        Ok(vec![page])
    }

    fn handle_client_message(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let result = match msg {
            ClientMessage::Open { table_name, config } => self.open(&table_name, config, ctx),

            ClientMessage::InsertRow { table_name, row } => self
                .state
                .insert_row(&table_name, row)
                .map(|rows| {
                    self.state.broadcast(&table_name, rows);
                    Vec::new()
                }),

            ClientMessage::DeleteRow { table_name, row_id } => self
                .state
                .delete_row(&table_name, &row_id)
                .map(|rows| {
                    self.state.broadcast(&table_name, rows);
                    Vec::new()
                }),

            view_msg => match self.session.as_mut() {
                Some(session) => session.handle(view_msg),
                None => Err(TableError::NoOpenTable),
            },
        };

        match result {
            Ok(messages) => {
                for message in &messages {
                    Self::send(ctx, message);
                }
            }
            Err(e) => Self::send(
                ctx,
                &ServerMessage::Error {
                    message: e.to_string(),
                },
            ),
        }
    }
}

impl Actor for TableWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hb(ctx);
    }

    fn stopped(&mut self, ctx: &mut Self::Context) {
        if let Some(session) = self.session.as_ref() {
            self.state.unsubscribe(session.table_name(), &ctx.address());
        }
    }
}

impl StreamHandler<std::result::Result<ws::Message, ws::ProtocolError>> for TableWebSocket {
    fn handle(
        &mut self,
        msg: std::result::Result<ws::Message, ws::ProtocolError>,
        ctx: &mut Self::Context,
    ) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match decode_client_message(&text) {
                Ok(client_msg) => {
                    self.handle_client_message(client_msg, ctx);
                }
                Err(e) => {
                    Self::send(
                        ctx,
                        &ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        },
                    );
                }
            },
            Ok(ws::Message::Binary(_)) => {
                log::warn!("Unexpected binary message");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            _ => ctx.stop(),
        }
    }
}

impl Handler<DatasetChanged> for TableWebSocket {
    type Result = ();

    fn handle(&mut self, msg: DatasetChanged, ctx: &mut Self::Context) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.table_name() != msg.table_name {
            return;
        }
        for message in session.refresh(msg.rows) {
            Self::send(ctx, &message);
        }
    }
}
