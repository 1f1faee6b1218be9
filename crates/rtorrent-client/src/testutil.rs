//! Shared test utilities and fixtures.

use crate::ops::MockXmlRpcOps;
use crate::xmlrpc::Value;

/// A 40 character info-hash made of `c`.
pub(crate) fn make_test_hash(c: char) -> String {
    c.to_string().repeat(40)
}

pub(crate) fn make_string_list(items: &[&str]) -> Value {
    Value::Array(items.iter().map(|s| Value::from(*s)).collect())
}

/// Tracker rows as `t.multicall` returns them: one single-column row per tracker.
pub(crate) fn make_tracker_rows(urls: &[&str]) -> Value {
    Value::Array(urls.iter().map(|u| make_string_list(&[*u])).collect())
}

/// Expect exactly one call of `method` with `params`, answered with `response`.
pub(crate) fn expect_call(
    mock: &mut MockXmlRpcOps,
    method: &'static str,
    params: Vec<Value>,
    response: Value,
) {
    mock.expect_call()
        .withf(move |m, p| m == method && *p == params)
        .times(1)
        .returning(move |_, _| Ok(response.clone()));
}
