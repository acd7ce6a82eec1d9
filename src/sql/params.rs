//! Values crossing the sqlx boundary: dynamic query parameters and the `state` column type.

use crate::model::DeviceState;
use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgTypeInfo, PgValueRef, Postgres};
use sqlx::{Database, Decode, Type};

/// A parameter of a dynamically built query. Each variant reports its own PostgreSQL type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    BigInt(i64),
}

impl From<&str> for BindValue {
    fn from(s: &str) -> Self {
        BindValue::Text(s.to_string())
    }
}

impl From<DeviceState> for BindValue {
    fn from(state: DeviceState) -> Self {
        BindValue::Text(state.as_str().to_string())
    }
}

impl From<i64> for BindValue {
    fn from(n: i64) -> Self {
        BindValue::BigInt(n)
    }
}

impl<'q> Encode<'q, Postgres> for BindValue {
    fn encode_by_ref(&self, buf: &mut <Postgres as Database>::ArgumentBuffer<'q>) -> Result<IsNull, BoxDynError> {
        match self {
            BindValue::Text(s) => <&str as Encode<Postgres>>::encode_by_ref(&s.as_str(), buf),
            BindValue::BigInt(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            BindValue::Text(_) => <&str as Type<Postgres>>::type_info(),
            BindValue::BigInt(_) => <i64 as Type<Postgres>>::type_info(),
        })
    }
}

impl Type<Postgres> for BindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

/// `state` is stored as TEXT holding the wire name.
impl Type<Postgres> for DeviceState {
    fn type_info() -> PgTypeInfo {
        <&str as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as Type<Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Postgres> for DeviceState {
    fn encode_by_ref(&self, buf: &mut <Postgres as Database>::ArgumentBuffer<'q>) -> Result<IsNull, BoxDynError> {
        <&str as Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> Decode<'r, Postgres> for DeviceState {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <&str as Decode<Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_values_report_their_type() {
        assert_eq!(BindValue::from(10_i64).produces(), Some(<i64 as Type<Postgres>>::type_info()));
        assert_eq!(BindValue::from("acme").produces(), Some(<&str as Type<Postgres>>::type_info()));
        assert_eq!(BindValue::from(DeviceState::InUse), BindValue::Text("IN_USE".into()));
    }
}
