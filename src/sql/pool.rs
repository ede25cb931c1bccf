//! Bounded connection pool.
//!
//! Connections are opened lazily up to `max`. Checkout blocks on a condvar
//! until a connection is returned or the timeout expires
//! (StorageError::PoolTimeout). The RAII guard returns the connection on
//! drop on every exit path, so an error during a statement never leaks a
//! pooled connection.

use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::{Result, StorageError};
use crate::sql::SqlDriver;

pub struct ConnectionPool<D: SqlDriver> {
    driver: D,
    state: Mutex<PoolState<D::Conn>>,
    available: Condvar,
    max: usize,
    timeout: Duration,
}

struct PoolState<C> {
    idle: Vec<C>,
    open: usize,
}

impl<D: SqlDriver> ConnectionPool<D> {
    pub fn new(driver: D, max: usize, timeout: Duration) -> Self {
        Self {
            driver,
            state: Mutex::new(PoolState {
                idle: Vec::new(),
                open: 0,
            }),
            available: Condvar::new(),
            max: max.max(1),
            timeout,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Check out a connection, opening a new one if the pool is below its
    /// bound, otherwise waiting until one is returned.
    pub fn acquire(&self) -> Result<PooledConn<'_, D>> {
        let deadline = Instant::now() + self.timeout;
        let mut st = self
            .state
            .lock()
            .map_err(|_| StorageError::Backend("pool lock poisoned".into()))?;

        loop {
            if let Some(conn) = st.idle.pop() {
                return Ok(PooledConn {
                    pool: self,
                    conn: Some(conn),
                });
            }

            if st.open < self.max {
                st.open += 1;
                drop(st);
                match self.driver.connect() {
                    Ok(conn) => {
                        return Ok(PooledConn {
                            pool: self,
                            conn: Some(conn),
                        })
                    }
                    Err(e) => {
                        self.forget_one();
                        return Err(e);
                    }
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(StorageError::PoolTimeout);
            }
            let (guard, wait) = self
                .available
                .wait_timeout(st, deadline - now)
                .map_err(|_| StorageError::Backend("pool lock poisoned".into()))?;
            st = guard;
            if wait.timed_out() && st.idle.is_empty() && st.open >= self.max {
                return Err(StorageError::PoolTimeout);
            }
        }
    }

    fn put_back(&self, conn: D::Conn) {
        if let Ok(mut st) = self.state.lock() {
            st.idle.push(conn);
        }
        self.available.notify_one();
    }

    /// Drop the slot of a connection that failed to open (or was discarded),
    /// so a waiter may open a fresh one.
    fn forget_one(&self) {
        if let Ok(mut st) = self.state.lock() {
            st.open = st.open.saturating_sub(1);
        }
        self.available.notify_one();
    }
}

/// Scoped checkout; derefs to the driver's connection type.
pub struct PooledConn<'a, D: SqlDriver> {
    pool: &'a ConnectionPool<D>,
    conn: Option<D::Conn>,
}

impl<'a, D: SqlDriver> Deref for PooledConn<'a, D> {
    type Target = D::Conn;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref().expect("connection present until drop")
    }
}

impl<'a, D: SqlDriver> DerefMut for PooledConn<'a, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect("connection present until drop")
    }
}

impl<'a, D: SqlDriver> Drop for PooledConn<'a, D> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.put_back(conn);
        }
    }
}
