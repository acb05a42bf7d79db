//! Member invocation
//!
//! `VAL` and friends reduce objects by calling their default member. How a
//! call reaches the object is decided by a [`MemberInvoker`]; the stock
//! [`DispatchInvoker`] resolves member names case-insensitively against the
//! object's member table and remembers each resolution in a [`MemberCache`]
//! that can be shared across requests.

use crate::error::{RuntimeError, RuntimeResult};
use crate::value::{ObjectRef, Value};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Strategy for calling members on script values
pub trait MemberInvoker: Send + Sync {
    /// Call `member` (or the default member when `None`) on `target`
    fn invoke(&self, target: &Value, member: Option<&str>, args: &[Value]) -> RuntimeResult<Value>;
}

/// Cache key: type name, member name (empty for the default member), arity.
/// Names are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberKey {
    type_name: String,
    member: String,
    arity: usize,
}

impl MemberKey {
    pub fn new(type_name: &str, member: Option<&str>, arity: usize) -> Self {
        MemberKey {
            type_name: type_name.to_ascii_lowercase(),
            member: member.unwrap_or_default().to_ascii_lowercase(),
            arity,
        }
    }
}

/// Outcome of resolving a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Call the member with this declared name
    Member(Arc<str>),
    /// No such member (or no default member)
    Missing,
    /// Member exists but does not accept this many arguments
    WrongArity,
}

/// Concurrent resolution cache.
///
/// Reads take a shared lock; a miss resolves outside the lock and inserts
/// only if no other thread got there first, so each key is stored once.
#[derive(Debug, Default)]
pub struct MemberCache {
    entries: RwLock<HashMap<MemberKey, Resolution>>,
}

impl MemberCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &MemberKey) -> Option<Resolution> {
        self.entries.read().get(key).cloned()
    }

    /// Return the cached resolution for `key`, computing it on a miss
    pub fn get_or_insert_with(
        &self,
        key: MemberKey,
        resolve: impl FnOnce() -> Resolution,
    ) -> Resolution {
        if let Some(found) = self.get(&key) {
            return found;
        }
        tracing::trace!(
            type_name = %key.type_name,
            member = %key.member,
            arity = key.arity,
            "member cache miss"
        );
        let resolved = resolve();
        self.entries.write().entry(key).or_insert(resolved).clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Default invoker: objects by member table, arrays by index
#[derive(Debug, Clone, Default)]
pub struct DispatchInvoker {
    cache: Arc<MemberCache>,
}

impl DispatchInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing cache, typically one per process
    pub fn with_cache(cache: Arc<MemberCache>) -> Self {
        DispatchInvoker { cache }
    }

    pub fn cache(&self) -> &Arc<MemberCache> {
        &self.cache
    }

    fn invoke_object(
        &self,
        object: &ObjectRef,
        member: Option<&str>,
        args: &[Value],
    ) -> RuntimeResult<Value> {
        let key = MemberKey::new(object.type_name(), member, args.len());
        let resolution = self
            .cache
            .get_or_insert_with(key, || resolve(object, member, args.len()));
        let context = member.unwrap_or(object.type_name());
        match resolution {
            Resolution::Member(name) => object.call(&name, args),
            Resolution::Missing => Err(RuntimeError::member_not_supported(context)),
            Resolution::WrongArity => Err(RuntimeError::wrong_argument_count(context)),
        }
    }
}

fn resolve(object: &ObjectRef, member: Option<&str>, arity: usize) -> Resolution {
    let Some(wanted) = member.or_else(|| object.default_member()) else {
        return Resolution::Missing;
    };
    match object
        .members()
        .into_iter()
        .find(|signature| signature.name.eq_ignore_ascii_case(wanted))
    {
        Some(signature) if signature.arity.contains(&arity) => {
            Resolution::Member(signature.name.into())
        }
        Some(_) => Resolution::WrongArity,
        None => Resolution::Missing,
    }
}

impl MemberInvoker for DispatchInvoker {
    fn invoke(&self, target: &Value, member: Option<&str>, args: &[Value]) -> RuntimeResult<Value> {
        match target {
            Value::Object(object) => self.invoke_object(object, member, args),
            Value::Nothing => Err(RuntimeError::object_variable_not_set(
                member.unwrap_or("default member"),
            )),
            Value::Array(array) if member.is_none() && !args.is_empty() => {
                let indices = args
                    .iter()
                    .map(array_index)
                    .collect::<RuntimeResult<Vec<_>>>()?;
                array.get(&indices).cloned()
            }
            _ => Err(RuntimeError::object_required(member.unwrap_or("default member"))),
        }
    }
}

/// Array subscripts round half-to-even like `CLng`
fn array_index(value: &Value) -> RuntimeResult<i64> {
    let raw = match value {
        Value::Empty => 0.0,
        Value::Boolean(b) => {
            if *b {
                -1.0
            } else {
                0.0
            }
        }
        Value::Byte(b) => f64::from(*b),
        Value::Integer(i) => f64::from(*i),
        Value::Long(l) => f64::from(*l),
        Value::Single(s) => f64::from(*s),
        Value::Double(d) => *d,
        Value::Currency(c) => c.to_f64(),
        Value::String(s) => crate::number::parse_numeric(s)
            .map(|n| n.value)
            .ok_or_else(|| RuntimeError::type_mismatch("array index"))?,
        Value::Null => return Err(RuntimeError::invalid_use_of_null("array index")),
        _ => return Err(RuntimeError::type_mismatch("array index")),
    };
    let rounded = raw.round_ties_even();
    if !(i32::MIN as f64..=i32::MAX as f64).contains(&rounded) {
        return Err(RuntimeError::subscript_out_of_range("array index"));
    }
    Ok(rounded as i64)
}
