//! # 요청 검증(Request Validation) 모듈
//!
//! 핸들러가 실행되기 전에 요청 본문(JSON)이나 쿼리스트링을 검증하고,
//! 타입이 확정된 값으로 변환해 넘겨주는 추출자(Extractor)들입니다.
//!
//! ## 구성
//! - `Schema`: 엔드포인트별 입력 타입이 구현하는 트레이트 (`models/*`에 구현)
//! - `Fields`: 원시 입력에서 필드를 하나씩 꺼내며 검증/변환하는 리더
//! - `ValidJson<T>`: 본문을 `T`로 검증하는 추출자
//! - `ValidQuery<T>`: 쿼리스트링을 `T`로 검증하는 추출자
//!
//! 검증에 실패한 필드는 모두 모아서 한 번에 422로 응답합니다.
//! 하나라도 실패하면 나머지 필드에 기본값을 채워 넘기는 일은 없습니다.
//!
//! ## 사용 예시
//! ```ignore
//! pub async fn create_tag(
//!     State(state): State<AppState>,
//!     auth: AuthUser,
//!     ValidJson(input): ValidJson<CreateTag>,
//! ) -> Result<ApiResponse<TagResponse>, AppError> { ... }
//! ```

use crate::{error::AppError, response::FieldErrors};
use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 엔드포인트 입력 스키마
///
/// `read`는 필드를 전부 읽으면서 실패를 `Fields`에 기록하고,
/// 필수 필드가 빠졌으면 `None`을 돌려줍니다.
/// 최종 성공/실패 판단은 `Fields::finish`가 합니다.
pub trait Schema: Sized {
    fn read(fields: &mut Fields<'_>) -> Option<Self>;
}

/// 정해진 문자열 집합 중 하나로만 받을 수 있는 값 (mood, sortBy 등)
pub trait Choice: Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|choice| choice.as_str() == raw)
    }
}

#[derive(Clone, Copy)]
enum Source<'a> {
    Body(&'a Map<String, Value>),
    Query(&'a HashMap<String, String>),
}

/// 필드 하나의 원시 값
enum Raw<'a> {
    Missing,
    Null,
    Json(&'a Value),
    Text(&'a str),
}

impl<'a> Raw<'a> {
    /// 문자열로 읽을 수 있으면 꺼냅니다 (JSON 문자열 또는 쿼리 값).
    fn as_text(&self) -> Option<&'a str> {
        match *self {
            Raw::Json(Value::String(s)) => Some(s.as_str()),
            Raw::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// 검증 중인 입력과 지금까지 쌓인 필드 에러
pub struct Fields<'a> {
    source: Source<'a>,
    errors: FieldErrors,
}

impl<'a> Fields<'a> {
    pub fn body(map: &'a Map<String, Value>) -> Self {
        Self {
            source: Source::Body(map),
            errors: FieldErrors::new(),
        }
    }

    pub fn query(map: &'a HashMap<String, String>) -> Self {
        Self {
            source: Source::Query(map),
            errors: FieldErrors::new(),
        }
    }

    fn raw(&self, name: &str) -> Raw<'a> {
        match self.source {
            Source::Body(map) => match map.get(name) {
                None => Raw::Missing,
                Some(Value::Null) => Raw::Null,
                Some(value) => Raw::Json(value),
            },
            Source::Query(map) => match map.get(name) {
                None => Raw::Missing,
                Some(value) => Raw::Text(value.as_str()),
            },
        }
    }

    /// 필드 에러를 기록합니다. 같은 필드는 첫 번째 메시지만 남깁니다.
    pub fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(path.into()).or_insert_with(|| message.into());
    }

    /// 문자열 필드 빌더를 시작합니다.
    pub fn text<'f>(&'f mut self, name: &'static str) -> TextField<'f, 'a> {
        TextField {
            fields: self,
            name,
            required: None,
            non_empty: None,
            trim: true,
            min: None,
            max: None,
            pattern: None,
        }
    }

    /// JSON boolean, 또는 쿼리의 `"true"` / `"false"`
    pub fn boolean(&mut self, name: &'static str) -> Option<bool> {
        match self.raw(name) {
            Raw::Missing => None,
            Raw::Json(Value::Bool(b)) => Some(*b),
            Raw::Text("true") => Some(true),
            Raw::Text("false") => Some(false),
            Raw::Text(_) => {
                self.error(name, format!("{name} must be 'true' or 'false'"));
                None
            }
            Raw::Null | Raw::Json(_) => {
                self.error(name, format!("{name} must be a boolean"));
                None
            }
        }
    }

    /// `min..=max` 범위의 정수. 쿼리 값은 문자열에서 변환합니다.
    pub fn integer(&mut self, name: &'static str, min: i64, max: i64) -> Option<i64> {
        let parsed = match self.raw(name) {
            Raw::Missing => return None,
            Raw::Json(value) => value.as_i64(),
            Raw::Text(s) => s.trim().parse::<i64>().ok(),
            Raw::Null => None,
        };
        match parsed {
            None => {
                self.error(name, format!("{name} must be an integer"));
                None
            }
            Some(n) if n < min => {
                self.error(name, format!("{name} must be at least {min}"));
                None
            }
            Some(n) if n > max => {
                self.error(name, format!("{name} must be at most {max}"));
                None
            }
            Some(n) => Some(n),
        }
    }

    /// 허용된 값 중 하나. 없으면 `None`.
    pub fn choice<C: Choice>(&mut self, name: &'static str) -> Option<C> {
        match self.raw(name) {
            Raw::Missing => None,
            raw => self.parse_choice(name, &raw),
        }
    }

    /// null을 허용하는 선택 값
    ///
    /// - 필드 없음 → `None` (변경 안 함)
    /// - `null` → `Some(None)` (값 지우기)
    /// - 값 → `Some(Some(v))`
    pub fn nullable_choice<C: Choice>(&mut self, name: &'static str) -> Option<Option<C>> {
        match self.raw(name) {
            Raw::Missing => None,
            Raw::Null => Some(None),
            raw => self.parse_choice(name, &raw).map(Some),
        }
    }

    fn parse_choice<C: Choice>(&mut self, name: &'static str, raw: &Raw<'a>) -> Option<C> {
        let parsed = raw.as_text().and_then(C::parse);
        if parsed.is_none() {
            let allowed: Vec<&str> = C::ALL.iter().map(Choice::as_str).collect();
            self.error(name, format!("{name} must be one of: {}", allowed.join(", ")));
        }
        parsed
    }

    /// RFC 3339 타임스탬프 또는 `YYYY-MM-DD` (UTC 자정)
    pub fn date(&mut self, name: &'static str) -> Option<DateTime<Utc>> {
        let raw = self.raw(name);
        if let Raw::Missing = raw {
            return None;
        }
        let parsed = raw.as_text().map(str::trim).and_then(parse_date);
        if parsed.is_none() {
            self.error(name, format!("{name} must be a valid date"));
        }
        parsed
    }

    /// 태그 id 목록. 중복은 그대로 둡니다 (소유권 검사에서 개수가 어긋나 거부됨).
    ///
    /// - 본문: 양의 정수 배열이어야 하며, 잘못된 원소는 `tagIds.<index>`로 보고합니다.
    /// - 쿼리: `"3,5,x"`처럼 쉼표로 구분합니다. 각 조각은 앞부분의 정수만 읽고
    ///   (`"7abc"` → 7), 숫자로 시작하지 않는 조각은 조용히 버립니다.
    pub fn id_list(&mut self, name: &'static str) -> Option<Vec<i64>> {
        match self.raw(name) {
            Raw::Missing => None,
            Raw::Text(csv) => Some(csv.split(',').filter_map(leading_int).collect()),
            Raw::Json(Value::Array(items)) => {
                let mut ids = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    match item.as_i64().filter(|id| *id > 0) {
                        Some(id) => ids.push(id),
                        None => self.error(
                            format!("{name}.{index}"),
                            "Expected a positive integer",
                        ),
                    }
                }
                Some(ids)
            }
            Raw::Null | Raw::Json(_) => {
                self.error(name, format!("{name} must be an array of ids"));
                None
            }
        }
    }

    /// 기록된 에러가 있으면 422, 없으면 스키마가 만든 값을 돌려줍니다.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, AppError> {
        if !self.errors.is_empty() {
            return Err(AppError::Validation(self.errors));
        }
        value.ok_or_else(|| {
            AppError::Internal("schema returned no value without a field error".to_string())
        })
    }
}

/// 조각 앞부분의 부호 있는 정수: `" 7abc"` → 7, `"-3"` → -3, `"x1"` → None
fn leading_int(part: &str) -> Option<i64> {
    let part = part.trim_start();
    let digits_from = usize::from(part.starts_with(['+', '-']));
    let end = part[digits_from..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(part.len(), |offset| digits_from + offset);
    part[..end].parse().ok()
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 문자열 필드 검증 규칙 빌더
///
/// 기본적으로 앞뒤 공백을 제거(trim)한 뒤 길이(문자 수)를 검사합니다.
pub struct TextField<'f, 'a> {
    fields: &'f mut Fields<'a>,
    name: &'static str,
    required: Option<&'static str>,
    non_empty: Option<&'static str>,
    trim: bool,
    min: Option<(usize, &'static str)>,
    max: Option<(usize, &'static str)>,
    pattern: Option<(&'static Regex, &'static str)>,
}

impl<'f, 'a> TextField<'f, 'a> {
    /// 필수 필드. 없거나 비어 있으면 `message`.
    pub fn required(mut self, message: &'static str) -> Self {
        self.required = Some(message);
        self.non_empty = Some(message);
        self
    }

    /// 선택 필드지만, 주어졌다면 비어 있으면 안 됨
    pub fn non_empty(mut self, message: &'static str) -> Self {
        self.non_empty = Some(message);
        self
    }

    /// 공백을 제거하지 않고 그대로 받습니다 (비밀번호).
    pub fn untrimmed(mut self) -> Self {
        self.trim = false;
        self
    }

    pub fn min(mut self, chars: usize, message: &'static str) -> Self {
        self.min = Some((chars, message));
        self
    }

    pub fn max(mut self, chars: usize, message: &'static str) -> Self {
        self.max = Some((chars, message));
        self
    }

    pub fn pattern(mut self, regex: &'static Regex, message: &'static str) -> Self {
        self.pattern = Some((regex, message));
        self
    }

    /// 규칙을 적용해 값을 꺼냅니다. 필드가 없으면(선택 필드) `None`.
    pub fn read(self) -> Option<String> {
        let TextField {
            fields,
            name,
            required,
            non_empty,
            trim,
            min,
            max,
            pattern,
        } = self;

        let raw = fields.raw(name);
        let text = match (&raw, raw.as_text()) {
            (_, Some(text)) => text,
            (Raw::Missing, _) => {
                if let Some(message) = required {
                    fields.error(name, message);
                }
                return None;
            }
            (Raw::Null, _) if required.is_some() => {
                fields.error(name, required.unwrap_or_default());
                return None;
            }
            _ => {
                fields.error(name, format!("{name} must be a string"));
                return None;
            }
        };

        let value = if trim { text.trim() } else { text };
        let length = value.chars().count();

        let failure = if value.is_empty() && non_empty.is_some() {
            non_empty
        } else if min.is_some_and(|(chars, _)| length < chars) {
            min.map(|(_, message)| message)
        } else if max.is_some_and(|(chars, _)| length > chars) {
            max.map(|(_, message)| message)
        } else if pattern.is_some_and(|(regex, _)| !regex.is_match(value)) {
            pattern.map(|(_, message)| message)
        } else {
            None
        };

        match failure {
            Some(message) => {
                fields.error(name, message);
                None
            }
            None => Some(value.to_string()),
        }
    }
}

/// JSON 본문을 `T` 스키마로 검증하는 추출자
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: Schema,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| invalid_input("body", rejection.body_text()))?;

        let Value::Object(map) = value else {
            return Err(invalid_input("body", "Expected a JSON object"));
        };

        let mut fields = Fields::body(&map);
        let parsed = T::read(&mut fields);
        fields.finish(parsed).map(ValidJson)
    }
}

/// 쿼리스트링을 `T` 스키마로 검증하는 추출자
#[derive(Debug)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: Schema,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| invalid_input("query", rejection.body_text()))?;

        let mut fields = Fields::query(&params);
        let parsed = T::read(&mut fields);
        fields.finish(parsed).map(ValidQuery)
    }
}

fn invalid_input(path: &str, message: impl Into<String>) -> AppError {
    let mut errors = FieldErrors::new();
    errors.insert(path.to_string(), message.into());
    AppError::Validation(errors)
}
