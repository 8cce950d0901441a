use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tally_domain::{Category, PaymentMethod, RecordId, Transaction, TransactionType};

use crate::{
    CategoryStore, CoreError, InMemoryStorage, KeyValueStorage, LoadOutcome, TransactionDraft,
    TransactionFilter, TransactionStore, CATEGORIES_KEY, DEFAULT_DATE_FORMAT, TRANSACTIONS_KEY,
};

fn memory() -> Arc<InMemoryStorage> {
    Arc::new(InMemoryStorage::new())
}

fn category_store(storage: &Arc<InMemoryStorage>) -> CategoryStore {
    CategoryStore::new(Arc::clone(storage) as Arc<dyn KeyValueStorage>)
}

fn transaction_store(storage: &Arc<InMemoryStorage>) -> TransactionStore {
    TransactionStore::new(Arc::clone(storage) as Arc<dyn KeyValueStorage>)
}

fn expense(name: &str, amount: rust_decimal::Decimal, categories: Vec<Category>) -> Transaction {
    TransactionDraft::new(TransactionType::Expense)
        .with_amount(amount)
        .with_name(name)
        .with_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        .with_categories(categories)
        .build(DEFAULT_DATE_FORMAT)
        .expect("valid draft")
}

#[tokio::test]
async fn added_category_is_found_once_after_reload() {
    let storage = memory();
    let store = category_store(&storage);
    let food = Category::named("Food");

    store.add(food.clone()).expect("added").wait().await.unwrap();

    let reloaded = category_store(&storage);
    assert_eq!(reloaded.load().await, LoadOutcome::Loaded(1));
    let matches: Vec<_> = reloaded
        .categories()
        .into_iter()
        .filter(|c| c.id == food.id)
        .collect();
    assert_eq!(matches, vec![food]);
}

#[tokio::test]
async fn duplicate_id_is_rejected_without_a_write() {
    let storage = memory();
    let store = category_store(&storage);
    let food = Category::named("Food");
    store.add(food.clone()).unwrap().wait().await.unwrap();

    let mut clash = Category::named("Groceries");
    clash.id = food.id.clone();
    assert!(store.add(clash).is_none());
    assert_eq!(store.categories(), vec![food]);
}

#[tokio::test]
async fn update_replaces_fields_in_place() {
    let storage = memory();
    let store = category_store(&storage);
    let rent = Category::named("Rent");
    let food = Category::named("Food");
    store.add(rent.clone());
    store.add(food.clone()).unwrap().wait().await.unwrap();

    let mut changed = rent.clone();
    changed.name = "Housing".into();
    changed.primary = true;
    changed.color = Some("#45B7D1".into());
    store.update(changed.clone()).unwrap().wait().await.unwrap();

    assert_eq!(store.categories(), vec![changed.clone(), food.clone()]);
    let reloaded = category_store(&storage);
    reloaded.load().await;
    assert_eq!(reloaded.categories(), vec![changed, food]);
}

#[tokio::test]
async fn update_of_unknown_id_is_a_no_op() {
    let store = category_store(&memory());
    store.add(Category::named("Food"));
    assert!(store.update(Category::named("Ghost")).is_none());
    assert_eq!(store.categories().len(), 1);
}

#[tokio::test]
async fn delete_removes_category_from_list_and_selections() {
    let storage = memory();
    let store = category_store(&storage);
    let food = Category::named("Food");
    let rent = Category::named("Rent");
    store.add(food.clone());
    store.add(rent.clone());
    store.set_selected(vec![food.clone(), rent.clone()]);
    store.set_temp_selected(vec![food.clone()]);
    store.set_editing(Some(food.clone()));

    store.delete(&food).unwrap().wait().await.unwrap();

    assert_eq!(store.categories(), vec![rent.clone()]);
    assert_eq!(store.selected(), vec![rent.clone()]);
    assert!(store.temp_selected().is_empty());
    assert_eq!(store.editing(), None);

    let reloaded = category_store(&storage);
    reloaded.load().await;
    assert_eq!(reloaded.categories(), vec![rent]);
}

#[tokio::test]
async fn delete_matches_by_id_not_by_instance() {
    let store = category_store(&memory());
    let food = Category::named("Food");
    store.add(food.clone());

    let mut stale_copy = food.clone();
    stale_copy.name = "Old name".into();
    assert!(store.delete(&stale_copy).is_some());
    assert!(store.categories().is_empty());
}

#[tokio::test]
async fn confirm_selection_puts_primary_first() {
    let store = category_store(&memory());
    let food = Category::named("Food");
    let home = Category::new("Home", Some("#FF6B6B".into()), true);

    assert!(store.toggle_temp(&food));
    assert!(store.toggle_temp(&home));
    let confirmed = store.confirm_selection();

    assert_eq!(confirmed, vec![home.clone(), food.clone()]);
    assert_eq!(store.selected(), vec![home, food]);
}

#[tokio::test]
async fn second_primary_cannot_be_staged() {
    let store = category_store(&memory());
    let home = Category::new("Home", None, true);
    let car = Category::new("Car", None, true);
    let food = Category::named("Food");
    store.toggle_temp(&home);
    store.toggle_temp(&food);
    let before = store.temp_selected();

    assert!(!store.toggle_temp(&car));
    assert!(!store.toggle_temp(&car));
    assert_eq!(store.temp_selected(), before);

    assert!(store.toggle_temp(&home));
    assert!(store.toggle_temp(&car));
    assert_eq!(store.temp_selected(), vec![food, car]);
}

#[tokio::test]
async fn clear_selection_resets_staged_and_confirmed() {
    let store = category_store(&memory());
    let food = Category::named("Food");
    store.toggle_temp(&food);
    store.confirm_selection();
    store.clear_selection();
    assert!(store.selected().is_empty());
    assert!(store.temp_selected().is_empty());
}

#[tokio::test]
async fn rename_trims_and_refreshes_selection_copies() {
    let storage = memory();
    let store = category_store(&storage);
    let food = Category::named("Food");
    store.add(food.clone());
    store.set_selected(vec![food.clone()]);

    assert!(store.rename(&food.id, "   ").is_none());
    assert!(store.rename(&food.id, "Food").is_none());
    store
        .rename(&food.id, "  Groceries ")
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(store.get(&food.id).unwrap().name, "Groceries");
    assert_eq!(store.selected()[0].name, "Groceries");
}

#[tokio::test]
async fn load_without_stored_data_keeps_list_empty() {
    let store = category_store(&memory());
    assert_eq!(store.load().await, LoadOutcome::Missing);
    assert!(store.categories().is_empty());
}

#[tokio::test]
async fn unreadable_data_leaves_current_list_alone() {
    let storage = Arc::new(InMemoryStorage::with_entry(CATEGORIES_KEY, "{not json"));
    let store = category_store(&storage);
    let food = Category::named("Food");
    store.add(food.clone());

    assert_eq!(store.load().await, LoadOutcome::Unreadable);
    assert_eq!(store.categories(), vec![food]);
}

#[tokio::test]
async fn failed_write_keeps_in_memory_change() {
    let storage = memory();
    storage.reject_writes(true);
    let store = transaction_store(&storage);
    let txn = expense("Coffee", dec!(3.50), vec![Category::named("Food")]);

    let result = store.add(txn.clone()).unwrap().wait().await;

    assert!(matches!(result, Err(CoreError::Storage(_))));
    assert_eq!(store.transactions(), vec![txn]);
    assert_eq!(storage.raw(TRANSACTIONS_KEY).await, None);
}

#[tokio::test]
async fn storage_converges_to_latest_mutation() {
    let storage = memory();
    let store = transaction_store(&storage);
    let food = Category::named("Food");
    let mut saves = Vec::new();
    for i in 0..20 {
        let txn = expense(&format!("item {i}"), dec!(1), vec![food.clone()]);
        saves.push(store.add(txn).unwrap());
    }
    let last = saves.pop().unwrap();
    drop(saves);
    last.wait().await.unwrap();

    let reloaded = transaction_store(&storage);
    assert_eq!(reloaded.load().await, LoadOutcome::Loaded(20));
    assert_eq!(reloaded.transactions(), store.transactions());
}

#[tokio::test]
async fn transactions_roundtrip_through_storage() {
    let storage = memory();
    let store = transaction_store(&storage);
    let home = Category::new("Home", Some("#98D8C8".into()), true);
    let first = expense("Rent", dec!(900), vec![Category::named("Bills"), home]);
    let second = TransactionDraft::new(TransactionType::Income)
        .with_amount(dec!(2500.75))
        .with_name("Salary")
        .with_description("March")
        .with_payment(PaymentMethod::Debit, "Bank card", Some(2))
        .with_categories(vec![Category::named("Work")])
        .build(DEFAULT_DATE_FORMAT)
        .unwrap();
    store.add(first);
    store.add(second).unwrap().wait().await.unwrap();

    let reloaded = transaction_store(&storage);
    reloaded.load().await;
    assert_eq!(reloaded.transactions(), store.transactions());
}

#[tokio::test]
async fn transaction_update_and_delete_by_id() {
    let store = transaction_store(&memory());
    let food = Category::named("Food");
    let coffee = expense("Coffee", dec!(3), vec![food.clone()]);
    let lunch = expense("Lunch", dec!(12), vec![food]);
    store.add(coffee.clone());
    store.add(lunch.clone());

    let mut pricier = coffee.clone();
    pricier.amount = dec!(4);
    assert!(store.update(pricier.clone()).is_some());
    assert_eq!(store.transactions(), vec![pricier, lunch.clone()]);

    assert!(store.delete(&coffee).is_some());
    assert!(store.delete(&coffee).is_none());
    assert_eq!(store.transactions(), vec![lunch]);
}

#[tokio::test]
async fn totals_and_filters_cover_the_list_view() {
    let store = transaction_store(&memory());
    let food = Category::named("Food");
    let work = Category::named("Work");
    store.add(expense("Groceries", dec!(40), vec![food.clone()]));
    store.add(expense("Dinner out", dec!(25.5), vec![food.clone()]));
    store.add(
        TransactionDraft::new(TransactionType::Income)
            .with_amount(dec!(100))
            .with_name("Freelance")
            .with_categories(vec![work.clone()])
            .build(DEFAULT_DATE_FORMAT)
            .unwrap(),
    );

    let totals = store.totals();
    assert_eq!(totals.income, dec!(100));
    assert_eq!(totals.expense, dec!(65.5));
    assert_eq!(totals.balance, dec!(34.5));

    let expenses = store.filter(&TransactionFilter::default().with_kind(TransactionType::Expense));
    assert_eq!(expenses.len(), 2);
    let with_work = store.filter(&TransactionFilter::default().with_category(work.id));
    assert_eq!(with_work[0].name, "Freelance");
    let dinner = store.filter(&TransactionFilter::default().with_text("DINNER"));
    assert_eq!(dinner.len(), 1);
}

#[tokio::test]
async fn negative_amounts_are_never_stored() {
    let storage = memory();
    let store = transaction_store(&storage);
    let mut refund = expense("Refund", dec!(5), vec![Category::named("Misc")]);
    refund.amount = dec!(-5);
    assert!(store.add(refund.clone()).is_none());
    assert!(store.is_empty());

    refund.amount = dec!(5);
    store.add(refund.clone()).expect("added").wait().await.expect("saved");
    refund.amount = dec!(-2);
    assert!(store.update(refund).is_none());
    assert_eq!(store.transactions()[0].amount, dec!(5));
}

#[tokio::test]
async fn lenient_legacy_records_load_and_survive_the_next_write() {
    let raw = r#"[
        {"id":"1","type":"egreso","amount":20,"date":"1/3/2024","categories":["Ropa"],
         "name":"Jacket","installments":"3 cuotas"},
        {"id":"2","type":"egreso","amount":null,"date":"2/3/2024","categories":[],"name":"Typo"},
        {"id":"3","type":"ingreso","amount":"1500","date":"3/3/2024","categories":[],"name":"Pay"}
    ]"#;
    let storage = Arc::new(InMemoryStorage::with_entry(TRANSACTIONS_KEY, raw));
    let store = transaction_store(&storage);
    assert_eq!(store.load().await, LoadOutcome::Loaded(3));

    let stored = store.transactions();
    assert_eq!(stored[0].installments, None);
    assert_eq!(stored[1].amount, dec!(0));

    store
        .add(expense("Bus", dec!(1), vec![Category::named("Transport")]))
        .expect("added")
        .wait()
        .await
        .expect("saved");
    let reopened = transaction_store(&storage);
    assert_eq!(reopened.load().await, LoadOutcome::Loaded(4));
}

#[test]
fn mutation_outside_runtime_still_updates_memory() {
    let store = category_store(&memory());
    let food = Category::named("Food");
    let save = store.add(food.clone()).expect("mutation applied");
    assert!(save.is_finished());
    assert_eq!(store.categories(), vec![food]);

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let result = runtime.block_on(save.wait());
    assert!(matches!(result, Err(CoreError::Background(_))));
}

#[test]
fn draft_requires_amount_name_and_category() {
    let base = TransactionDraft::new(TransactionType::Expense)
        .with_amount(dec!(10))
        .with_name("Taxi")
        .with_categories(vec![Category::named("Transport")]);
    assert!(base.build(DEFAULT_DATE_FORMAT).is_ok());

    let mut missing_amount = base.clone();
    missing_amount.amount = None;
    assert!(matches!(
        missing_amount.build(DEFAULT_DATE_FORMAT),
        Err(CoreError::Validation(_))
    ));

    let blank_name = base.clone().with_name("   ");
    assert!(blank_name.build(DEFAULT_DATE_FORMAT).is_err());

    let no_categories = base.clone().with_categories(Vec::new());
    assert!(no_categories.build(DEFAULT_DATE_FORMAT).is_err());

    let negative = base.clone().with_amount(dec!(-1));
    assert!(negative.build(DEFAULT_DATE_FORMAT).is_err());

    let two_primaries = base.with_categories(vec![
        Category::new("Home", None, true),
        Category::new("Work", None, true),
    ]);
    assert!(matches!(
        two_primaries.build(DEFAULT_DATE_FORMAT),
        Err(CoreError::Validation(_))
    ));
}

#[test]
fn draft_applies_payment_rules() {
    let base = TransactionDraft::new(TransactionType::Expense)
        .with_amount(dec!(300))
        .with_name("Phone")
        .with_categories(vec![Category::named("Tech")]);

    let credit = base
        .clone()
        .with_payment(PaymentMethod::Credit, "Visa", Some(6))
        .build(DEFAULT_DATE_FORMAT)
        .unwrap();
    assert_eq!(credit.installments, Some(6));
    assert_eq!(credit.card_name.as_deref(), Some("Visa"));

    let debit = base
        .clone()
        .with_payment(PaymentMethod::Debit, "Maestro", Some(6))
        .build(DEFAULT_DATE_FORMAT)
        .unwrap();
    assert_eq!(debit.installments, None);
    assert_eq!(debit.card_name.as_deref(), Some("Maestro"));

    let cash = base
        .with_payment(PaymentMethod::Cash, "Visa", Some(6))
        .build(DEFAULT_DATE_FORMAT)
        .unwrap();
    assert_eq!(cash.installments, None);
    assert_eq!(cash.card_name, None);
}

#[test]
fn draft_formats_date_and_orders_categories() {
    let home = Category::new("Home", None, true);
    let txn = TransactionDraft::new(TransactionType::Expense)
        .with_amount(dec!(1))
        .with_name("Bulb")
        .with_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        .with_categories(vec![Category::named("Misc"), home.clone()])
        .build(DEFAULT_DATE_FORMAT)
        .unwrap();
    assert_eq!(txn.date, "05/03/2024");
    assert_eq!(txn.parsed_date(), NaiveDate::from_ymd_opt(2024, 3, 5));
    assert_eq!(txn.categories[0], home);
    assert_ne!(txn.id, RecordId::new(""));
}
