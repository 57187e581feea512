//! finanz-ffi
//!
//! C ABI consumed by the mobile presentation layer. Structured values cross
//! the boundary as JSON strings; every string handed out must be released
//! with [`finanz_string_free`].

use std::{
    ffi::{CStr, CString},
    os::raw::{c_char, c_double, c_int},
    path::PathBuf,
    ptr,
};

use finanz_core::{
    BudgetRepository, CoreError, EntryDraft, EntryService, NewMonth, RateService, SummaryService,
};
use finanz_domain::{EntryId, Flow, MonthKey};
use finanz_storage_json::JsonFileStore;

const OK: c_int = 0;
const NULL_ARGUMENT: c_int = 1;
const INVALID_ARGUMENT: c_int = 2;
const OPERATION_FAILED: c_int = 3;

/// Opaque pointer holding an open repository.
pub struct FinanzHandle {
    repo: BudgetRepository<JsonFileStore>,
}

/// Balance snapshot of one month, all figures in USD unless noted.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FfiMonthBalance {
    pub income_est: c_double,
    pub expense_est: c_double,
    pub real_income_usd: c_double,
    pub real_expense_usd: c_double,
    pub real_income_local: c_double,
    pub real_expense_local: c_double,
    pub balance_usd: c_double,
}

#[no_mangle]
pub extern "C" fn finanz_open(
    data_root: *const c_char,
    out_error: *mut *mut c_char,
) -> *mut FinanzHandle {
    clear_error(out_error);
    let opened = unsafe { c_string_argument(data_root) }
        .and_then(|root| JsonFileStore::new(PathBuf::from(root)));
    match opened {
        Ok(store) => Box::into_raw(Box::new(FinanzHandle {
            repo: BudgetRepository::new(store),
        })),
        Err(err) => {
            unsafe { write_core_error(out_error, err) };
            ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "C" fn finanz_free(handle: *mut FinanzHandle) {
    if handle.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(handle));
    }
}

#[no_mangle]
pub extern "C" fn finanz_string_free(value: *mut c_char) {
    if value.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(value));
    }
}

/// Writes the month as JSON to `out_json`, or `null` when it does not exist.
#[no_mangle]
pub extern "C" fn finanz_month_json(
    handle: *const FinanzHandle,
    year: c_int,
    month: c_int,
    out_json: *mut *mut c_char,
    out_error: *mut *mut c_char,
) -> c_int {
    clear_error(out_error);
    let Some(repo) = (unsafe { repo_ref(handle, out_error) }) else {
        return NULL_ARGUMENT;
    };
    let result = month_key(year, month)
        .and_then(|key| repo.get_month(key))
        .and_then(|data| Ok(serde_json::to_string(&data)?));
    match result {
        Ok(json) => {
            unsafe { write_string(out_json, json) };
            OK
        }
        Err(err) => unsafe { report(out_error, err) },
    }
}

/// Creates a month from a JSON body shaped like the stored month header:
/// `{"currency":{"name","code"},"rate","incomeEst","expenseEst","expenseEstItems"}`.
#[no_mangle]
pub extern "C" fn finanz_create_month(
    handle: *const FinanzHandle,
    year: c_int,
    month: c_int,
    request_json: *const c_char,
    out_error: *mut *mut c_char,
) -> c_int {
    clear_error(out_error);
    let Some(repo) = (unsafe { repo_ref(handle, out_error) }) else {
        return NULL_ARGUMENT;
    };
    let result = month_key(year, month).and_then(|key| {
        let body = unsafe { c_string_argument(request_json) }?;
        let input: NewMonth = serde_json::from_str(&body)
            .map_err(|err| CoreError::Validation(format!("invalid month request: {err}")))?;
        repo.create_month(key, input)
    });
    match result {
        Ok(_) => OK,
        Err(err) => unsafe { report(out_error, err) },
    }
}

#[no_mangle]
pub extern "C" fn finanz_delete_month(
    handle: *const FinanzHandle,
    year: c_int,
    month: c_int,
    out_deleted: *mut c_int,
    out_error: *mut *mut c_char,
) -> c_int {
    clear_error(out_error);
    let Some(repo) = (unsafe { repo_ref(handle, out_error) }) else {
        return NULL_ARGUMENT;
    };
    match month_key(year, month).and_then(|key| repo.delete_month(key)) {
        Ok(deleted) => {
            if !out_deleted.is_null() {
                unsafe { *out_deleted = c_int::from(deleted) };
            }
            OK
        }
        Err(err) => unsafe { report(out_error, err) },
    }
}

#[no_mangle]
pub extern "C" fn finanz_apply_rate(
    handle: *const FinanzHandle,
    year: c_int,
    month: c_int,
    rate: c_double,
    out_error: *mut *mut c_char,
) -> c_int {
    clear_error(out_error);
    let Some(repo) = (unsafe { repo_ref(handle, out_error) }) else {
        return NULL_ARGUMENT;
    };
    let result = month_key(year, month)
        .and_then(|key| repo.update_month(key, |data| RateService::apply(data, rate)));
    match result {
        Ok(_) => OK,
        Err(err) => unsafe { report(out_error, err) },
    }
}

/// Records a movement. `flow` is 0 for income and 1 for expense; a null or
/// empty `category_id` opens a new category. The resulting placement is
/// written to `out_json`.
#[no_mangle]
pub extern "C" fn finanz_add_entry(
    handle: *const FinanzHandle,
    year: c_int,
    month: c_int,
    flow: c_int,
    category_id: *const c_char,
    draft_json: *const c_char,
    out_json: *mut *mut c_char,
    out_error: *mut *mut c_char,
) -> c_int {
    clear_error(out_error);
    let Some(repo) = (unsafe { repo_ref(handle, out_error) }) else {
        return NULL_ARGUMENT;
    };
    let result = month_key(year, month).and_then(|key| {
        let flow = flow_from_code(flow)?;
        let category = unsafe { optional_string_argument(category_id) }?.map(EntryId::from);
        let body = unsafe { c_string_argument(draft_json) }?;
        let draft: EntryDraft = serde_json::from_str(&body)
            .map_err(|err| CoreError::Validation(format!("invalid entry: {err}")))?;
        let placement = repo.update_month(key, |data| {
            EntryService::add(data, flow, category.as_ref(), draft)
        })?;
        Ok(serde_json::to_string(&placement)?)
    });
    match result {
        Ok(json) => {
            unsafe { write_string(out_json, json) };
            OK
        }
        Err(err) => unsafe { report(out_error, err) },
    }
}

#[no_mangle]
pub extern "C" fn finanz_month_balance(
    handle: *const FinanzHandle,
    year: c_int,
    month: c_int,
    out_balance: *mut FfiMonthBalance,
    out_error: *mut *mut c_char,
) -> c_int {
    clear_error(out_error);
    if out_balance.is_null() {
        unsafe { write_error(out_error, "output balance is null") };
        return NULL_ARGUMENT;
    }
    let Some(repo) = (unsafe { repo_ref(handle, out_error) }) else {
        return NULL_ARGUMENT;
    };
    match month_key(year, month).and_then(|key| repo.require_month(key)) {
        Ok(data) => {
            let balance = SummaryService::month_balance(&data);
            unsafe {
                *out_balance = FfiMonthBalance {
                    income_est: balance.income_est,
                    expense_est: balance.expense_est,
                    real_income_usd: balance.real_income_usd,
                    real_expense_usd: balance.real_expense_usd,
                    real_income_local: balance.real_income_local,
                    real_expense_local: balance.real_expense_local,
                    balance_usd: balance.balance_usd,
                };
            }
            OK
        }
        Err(err) => unsafe { report(out_error, err) },
    }
}

fn month_key(year: c_int, month: c_int) -> Result<MonthKey, CoreError> {
    let month = u32::try_from(month)
        .map_err(|_| CoreError::Validation(format!("month {month} is outside 1-12")))?;
    Ok(MonthKey::new(year, month)?)
}

fn flow_from_code(code: c_int) -> Result<Flow, CoreError> {
    match code {
        0 => Ok(Flow::Income),
        1 => Ok(Flow::Expense),
        other => Err(CoreError::Validation(format!("unknown flow code {other}"))),
    }
}

unsafe fn repo_ref<'a>(
    handle: *const FinanzHandle,
    out_error: *mut *mut c_char,
) -> Option<&'a BudgetRepository<JsonFileStore>> {
    if handle.is_null() {
        write_error(out_error, "finanz handle is null");
        return None;
    }
    Some(&(*handle).repo)
}

unsafe fn report(out_error: *mut *mut c_char, err: CoreError) -> c_int {
    let code = if err.is_validation() || matches!(err, CoreError::MonthNotFound(_)) {
        INVALID_ARGUMENT
    } else {
        OPERATION_FAILED
    };
    write_core_error(out_error, err);
    code
}

fn clear_error(out_error: *mut *mut c_char) {
    if out_error.is_null() {
        return;
    }
    unsafe {
        *out_error = ptr::null_mut();
    }
}

unsafe fn write_error(out_error: *mut *mut c_char, message: &str) {
    if out_error.is_null() {
        return;
    }
    if let Ok(cstring) = CString::new(message) {
        *out_error = cstring.into_raw();
    }
}

unsafe fn write_core_error(out_error: *mut *mut c_char, err: CoreError) {
    write_error(out_error, &err.to_string());
}

unsafe fn write_string(target: *mut *mut c_char, value: String) {
    if target.is_null() {
        return;
    }
    if let Ok(cstring) = CString::new(value) {
        *target = cstring.into_raw();
    }
}

unsafe fn c_string_argument(ptr: *const c_char) -> Result<String, CoreError> {
    if ptr.is_null() {
        return Err(CoreError::Validation("null string pointer received".into()));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(|s| s.to_string())
        .map_err(|err| CoreError::Validation(err.to_string()))
}

unsafe fn optional_string_argument(ptr: *const c_char) -> Result<Option<String>, CoreError> {
    if ptr.is_null() {
        return Ok(None);
    }
    let raw = c_string_argument(ptr)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(value: &str) -> CString {
        CString::new(value).unwrap()
    }

    unsafe fn take(value: *mut c_char) -> String {
        let text = CStr::from_ptr(value).to_str().unwrap().to_string();
        finanz_string_free(value);
        text
    }

    #[test]
    fn month_lifecycle_over_the_c_abi() {
        let dir = tempfile::tempdir().unwrap();
        let root = c(dir.path().to_str().unwrap());
        let mut error: *mut c_char = ptr::null_mut();

        let handle = finanz_open(root.as_ptr(), &mut error);
        assert!(!handle.is_null());

        let request = c(r#"{"currency":{"name":"Peso","code":"ARS"},"rate":1000,"incomeEst":500,"expenseEst":200}"#);
        assert_eq!(finanz_create_month(handle, 2024, 3, request.as_ptr(), &mut error), OK);
        assert_eq!(
            finanz_create_month(handle, 2024, 3, request.as_ptr(), &mut error),
            INVALID_ARGUMENT
        );
        assert!(unsafe { take(error) }.contains("already exists"));

        let draft = c(r#"{"description":"Sueldo","amountLocal":100000,"date":"2024-03-01"}"#);
        let mut placement: *mut c_char = ptr::null_mut();
        let status = finanz_add_entry(
            handle,
            2024,
            3,
            0,
            ptr::null(),
            draft.as_ptr(),
            &mut placement,
            &mut error,
        );
        assert_eq!(status, OK);
        assert!(unsafe { take(placement) }.contains("categoryId"));

        assert_eq!(finanz_apply_rate(handle, 2024, 3, 1250.0, &mut error), OK);
        assert_eq!(finanz_apply_rate(handle, 2024, 3, -1.0, &mut error), INVALID_ARGUMENT);
        unsafe { finanz_string_free(error) };

        let mut balance = FfiMonthBalance::default();
        assert_eq!(finanz_month_balance(handle, 2024, 3, &mut balance, &mut error), OK);
        assert_eq!(balance.real_income_usd, 80.0);
        assert_eq!(balance.real_income_local, 100_000.0);

        let mut json: *mut c_char = ptr::null_mut();
        assert_eq!(finanz_month_json(handle, 2024, 3, &mut json, &mut error), OK);
        assert!(unsafe { take(json) }.contains("\"rate\":1250"));

        let mut deleted: c_int = 0;
        assert_eq!(finanz_delete_month(handle, 2024, 3, &mut deleted, &mut error), OK);
        assert_eq!(deleted, 1);
        assert_eq!(finanz_month_json(handle, 2024, 3, &mut json, &mut error), OK);
        assert_eq!(unsafe { take(json) }, "null");

        assert_eq!(finanz_month_json(handle, 2024, 13, &mut json, &mut error), INVALID_ARGUMENT);
        unsafe { finanz_string_free(error) };
        finanz_free(handle);
    }

    #[test]
    fn null_handle_is_reported() {
        let mut error: *mut c_char = ptr::null_mut();
        let status = finanz_apply_rate(ptr::null(), 2024, 1, 10.0, &mut error);
        assert_eq!(status, NULL_ARGUMENT);
        assert_eq!(unsafe { take(error) }, "finanz handle is null");
    }
}
