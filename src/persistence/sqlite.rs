use super::seed::SeedData;
use super::{
    BookingLookup, DatasetCounts, DatasetSession, DatasetSnapshot, StaffLookup, StoreError,
    StoreResult,
};
use crate::model::{
    Assignment, Employee, Network, Operation, OperationStatus, Project, Relationship,
    RelationshipKind, Resource,
};
use crate::timeline::{Interval, format_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction, TransactionBehavior, params};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const SCHEMA: &str = include_str!("schema.sql");

const REQUIRED_TABLES: [&str; 8] = [
    "facilities",
    "resources",
    "employees",
    "projects",
    "networks",
    "operations",
    "relationships",
    "assignments",
];

/// SQLite-backed dataset: schema, seed loading, the generation write session
/// and whole-dataset reads for auditing.
pub struct SqliteDatasetStore {
    connection: Connection,
}

impl SqliteDatasetStore {
    /// Opens (or creates) the database at `path` and applies the bundled schema.
    pub fn create<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let connection = Connection::open(path)?;
        Self::configure(&connection)?;
        Self::initialize_schema(&connection)?;
        Ok(Self { connection })
    }

    /// Opens an existing dataset. Every table the generator touches must exist.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StoreError::InputMissing(format!(
                "database {} does not exist",
                path.display()
            )));
        }
        let connection = Connection::open(path)?;
        Self::configure(&connection)?;
        Self::ensure_schema(&connection)?;
        Ok(Self { connection })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::configure(&connection)?;
        Self::initialize_schema(&connection)?;
        Ok(Self { connection })
    }

    fn configure(connection: &Connection) -> StoreResult<()> {
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }

    fn initialize_schema(connection: &Connection) -> StoreResult<()> {
        connection.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn ensure_schema(connection: &Connection) -> StoreResult<()> {
        let mut stmt = connection.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let missing: Vec<&str> = REQUIRED_TABLES
            .iter()
            .copied()
            .filter(|name| !tables.iter().any(|t| t == name))
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::InputMissing(format!(
                "schema is missing tables: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    /// Writes facilities, resources, employees and project shells in one transaction.
    pub fn load_seed(&mut self, seed: &SeedData) -> StoreResult<()> {
        seed.validate()?;
        let tx = self.connection.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO facilities (id, code, name) VALUES (?1, ?2, ?3)")?;
            for facility in &seed.facilities {
                stmt.execute(params![facility.id, facility.code, facility.name])?;
            }
            let mut stmt = tx.prepare(
                "INSERT INTO resources (id, facility_id, code, name) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for resource in &seed.resources {
                stmt.execute(params![
                    resource.id,
                    resource.facility_id,
                    resource.code,
                    resource.name
                ])?;
            }
            let mut stmt = tx.prepare(
                "INSERT INTO employees (id, resource_id, first_name, last_name, active)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for employee in &seed.employees {
                stmt.execute(params![
                    employee.id,
                    employee.resource_id,
                    employee.first_name,
                    employee.last_name,
                    employee.active
                ])?;
            }
            let mut stmt = tx.prepare(
                "INSERT INTO projects (id, code, name, planned_start, planned_end)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for project in &seed.projects {
                let start = normalize_timestamp(&project.planned_start)?;
                let end = normalize_timestamp(&project.planned_end)?;
                stmt.execute(params![project.id, project.code, project.name, start, end])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Runs a raw SQL seed script.
    pub fn load_seed_sql<P: AsRef<Path>>(&mut self, path: P) -> StoreResult<()> {
        let sql = fs::read_to_string(path)?;
        self.connection.execute_batch(&sql)?;
        Ok(())
    }

    /// Opens the exclusive write session for a generation run.
    pub fn session(&mut self) -> StoreResult<SqliteSession<'_>> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(SqliteSession { tx })
    }

    pub fn counts(&self) -> StoreResult<DatasetCounts> {
        query_counts(&self.connection)
    }

    pub fn snapshot(&self) -> StoreResult<DatasetSnapshot> {
        let conn = &self.connection;
        Ok(DatasetSnapshot {
            resources: query_resources(conn)?,
            employees: query_employees(conn, "SELECT id, resource_id, first_name, last_name, active FROM employees ORDER BY id", [])?,
            projects: query_projects(conn)?,
            networks: query_networks(conn)?,
            operations: query_operations(conn)?,
            relationships: query_relationships(conn)?,
            assignments: query_assignments(conn)?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

/// Write session over a `BEGIN IMMEDIATE` transaction. Rolls back on drop
/// unless committed.
pub struct SqliteSession<'a> {
    tx: Transaction<'a>,
}

impl BookingLookup for SqliteSession<'_> {
    fn count_overlapping(&self, resource_id: i64, candidate: &Interval) -> StoreResult<usize> {
        let mut stmt = self.tx.prepare_cached(
            "SELECT COUNT(*) FROM operations
             WHERE resource_id = ?1 AND ?2 < end_time AND start_time < ?3",
        )?;
        let count: i64 = stmt.query_row(
            params![
                resource_id,
                format_timestamp(candidate.start),
                format_timestamp(candidate.end)
            ],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl StaffLookup for SqliteSession<'_> {
    fn active_employees(&self, resource_id: i64) -> StoreResult<Vec<Employee>> {
        query_employees(
            &self.tx,
            "SELECT id, resource_id, first_name, last_name, active FROM employees
             WHERE resource_id = ?1 AND active = 1 ORDER BY id",
            params![resource_id],
        )
    }
}

impl DatasetSession for SqliteSession<'_> {
    fn projects(&self) -> StoreResult<Vec<Project>> {
        query_projects(&self.tx)
    }

    fn resources(&self) -> StoreResult<Vec<Resource>> {
        query_resources(&self.tx)
    }

    fn counts(&self) -> StoreResult<DatasetCounts> {
        query_counts(&self.tx)
    }

    fn insert_network(&mut self, network: &Network) -> StoreResult<()> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO networks (id, project_id, code, name, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        stmt.execute(params![
            network.id,
            network.project_id,
            network.code,
            network.name,
            network.description
        ])?;
        Ok(())
    }

    fn insert_operation(&mut self, operation: &Operation) -> StoreResult<()> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO operations
             (id, network_id, resource_id, code, name, start_time, end_time,
              progress_pct, status, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        stmt.execute(params![
            operation.id,
            operation.network_id,
            operation.resource_id,
            operation.code,
            operation.name,
            format_timestamp(operation.start),
            format_timestamp(operation.end),
            operation.progress_pct,
            operation.status.as_str(),
            operation.description
        ])?;
        Ok(())
    }

    fn insert_relationship(&mut self, relationship: &Relationship) -> StoreResult<()> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO relationships (id, predecessor_id, successor_id, kind, buffer, remark)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        stmt.execute(params![
            relationship.id,
            relationship.predecessor_id,
            relationship.successor_id,
            relationship.kind.as_str(),
            relationship.buffer,
            relationship.remark
        ])?;
        Ok(())
    }

    fn insert_assignment(&mut self, assignment: &Assignment) -> StoreResult<()> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO assignments (id, operation_id, employee_id, role, capacity_pct)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        stmt.execute(params![
            assignment.id,
            assignment.operation_id,
            assignment.employee_id,
            assignment.role,
            assignment.capacity_pct
        ])?;
        Ok(())
    }

    fn commit(self) -> StoreResult<()> {
        self.tx.commit()?;
        Ok(())
    }
}

fn normalize_timestamp(raw: &str) -> StoreResult<String> {
    parse_timestamp(raw)
        .map(format_timestamp)
        .ok_or_else(|| StoreError::InvalidData(format!("invalid timestamp '{raw}'")))
}

fn read_timestamp(raw: &str, what: &str) -> StoreResult<DateTime<Utc>> {
    parse_timestamp(raw)
        .ok_or_else(|| StoreError::InvalidData(format!("invalid {what} timestamp '{raw}'")))
}

fn count(conn: &Connection, sql: &str) -> StoreResult<usize> {
    let value: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(value as usize)
}

fn query_counts(conn: &Connection) -> StoreResult<DatasetCounts> {
    Ok(DatasetCounts {
        facilities: count(conn, "SELECT COUNT(*) FROM facilities")?,
        resources: count(conn, "SELECT COUNT(*) FROM resources")?,
        employees: count(conn, "SELECT COUNT(*) FROM employees")?,
        active_employees: count(conn, "SELECT COUNT(*) FROM employees WHERE active = 1")?,
        projects: count(conn, "SELECT COUNT(*) FROM projects")?,
        networks: count(conn, "SELECT COUNT(*) FROM networks")?,
        operations: count(conn, "SELECT COUNT(*) FROM operations")?,
        relationships: count(conn, "SELECT COUNT(*) FROM relationships")?,
        assignments: count(conn, "SELECT COUNT(*) FROM assignments")?,
    })
}

fn query_projects(conn: &Connection) -> StoreResult<Vec<Project>> {
    let mut stmt = conn.prepare(
        "SELECT id, code, name, planned_start, planned_end FROM projects ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, code, name, start, end)| {
            Ok(Project {
                id,
                planned_start: read_timestamp(&start, "planned_start")?,
                planned_end: read_timestamp(&end, "planned_end")?,
                code,
                name,
            })
        })
        .collect()
}

fn query_resources(conn: &Connection) -> StoreResult<Vec<Resource>> {
    let mut stmt = conn.prepare("SELECT id, facility_id, code, name FROM resources ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Resource {
                id: row.get(0)?,
                facility_id: row.get(1)?,
                code: row.get(2)?,
                name: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_employees<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> StoreResult<Vec<Employee>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt
        .query_map(params, |row| {
            Ok(Employee {
                id: row.get(0)?,
                resource_id: row.get(1)?,
                first_name: row.get(2)?,
                last_name: row.get(3)?,
                active: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_networks(conn: &Connection) -> StoreResult<Vec<Network>> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, code, name, COALESCE(description, '') FROM networks ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Network {
                id: row.get(0)?,
                project_id: row.get(1)?,
                code: row.get(2)?,
                name: row.get(3)?,
                description: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Operations in creation order. `sequence` is rebuilt from id order inside
/// each network, since ids are handed out monotonically.
fn query_operations(conn: &Connection) -> StoreResult<Vec<Operation>> {
    let mut stmt = conn.prepare(
        "SELECT id, network_id, resource_id, code, name, start_time, end_time,
                progress_pct, status, COALESCE(description, '')
         FROM operations ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, f64>(7)?,
                row.get::<_, String>(8)?,
                row.get::<_, String>(9)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut next_sequence: HashMap<i64, usize> = HashMap::new();
    let mut operations = Vec::with_capacity(rows.len());
    for (id, network_id, resource_id, code, name, start, end, progress_pct, status, description) in
        rows
    {
        let status = OperationStatus::from_str(&status).ok_or_else(|| {
            StoreError::InvalidData(format!("operation {id} has unknown status '{status}'"))
        })?;
        let sequence = next_sequence.entry(network_id).or_insert(0);
        operations.push(Operation {
            id,
            network_id,
            resource_id,
            code,
            name,
            start: read_timestamp(&start, "start")?,
            end: read_timestamp(&end, "end")?,
            progress_pct,
            status,
            description,
            sequence: *sequence,
        });
        *sequence += 1;
    }
    Ok(operations)
}

fn query_relationships(conn: &Connection) -> StoreResult<Vec<Relationship>> {
    let mut stmt = conn.prepare(
        "SELECT id, predecessor_id, successor_id, kind, buffer, COALESCE(remark, '')
         FROM relationships ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, predecessor_id, successor_id, kind, buffer, remark)| {
            let kind = RelationshipKind::from_str(&kind).ok_or_else(|| {
                StoreError::InvalidData(format!("relationship {id} has unknown kind '{kind}'"))
            })?;
            Ok(Relationship {
                id,
                predecessor_id,
                successor_id,
                kind,
                buffer,
                remark,
            })
        })
        .collect()
}

fn query_assignments(conn: &Connection) -> StoreResult<Vec<Assignment>> {
    let mut stmt = conn.prepare(
        "SELECT id, operation_id, employee_id, role, capacity_pct FROM assignments ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Assignment {
                id: row.get(0)?,
                operation_id: row.get(1)?,
                employee_id: row.get(2)?,
                role: row.get(3)?,
                capacity_pct: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
