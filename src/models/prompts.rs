use rust_decimal::Decimal;

use crate::models::{Action, InlineButton, Keyboard, Purchase};
use crate::types::ValidationError;

pub const NEW_ENTRY_BUTTON: &str = "➕ Новая запись";
pub const CANCEL_BUTTON: &str = "❌ Отмена";

pub const START_COMMAND: &str = "start";
pub const CANCEL_COMMAND: &str = "cancel";

pub const DATE_PROMPT: &str = "📆 Введите дату покупки (дд.мм.гггг):";
pub const NEXT_DATE_PROMPT: &str = "📆 Введите дату новой покупки (дд.мм.гггг):";
pub const SELLER_PROMPT: &str = "👤 У кого покупка?";
pub const DESCRIPTION_PROMPT: &str = "📦 Что купили?";
pub const PRICE_PROMPT: &str = "💰 Цена за единицу?";
pub const UNIT_PROMPT: &str = "📏 Единица измерения (например: кг, шт, л):";
pub const QUANTITY_PROMPT: &str = "🔢 Количество?";
pub const NOTE_PROMPT: &str = "📝 Примечание (или «–»):";

pub const DATE_FORMAT_ERROR: &str = "❌ Введите дату в формате дд.мм.гггг (например, 02.06.2025)";
pub const DATE_CALENDAR_ERROR: &str = "❌ Такой даты не существует. Попробуйте снова.";
pub const PRICE_ERROR: &str = "❌ Введите числовое значение (например: 12.5)";
pub const QUANTITY_ERROR: &str = "❌ Введите числовое значение (например: 4)";
pub const TOO_LARGE_ERROR: &str = "❌ Слишком большое значение. Введите меньшее число.";
pub const OUT_OF_RANGE_ERROR: &str = "❌ Число вне допустимого диапазона. Попробуйте снова.";
pub const BLANK_ERROR: &str = "❌ Значение не может быть пустым. Попробуйте снова.";

pub const CANCELLED: &str = "❌ Ввод отменён.";
pub const SUBMITTED: &str = "✅ Данные записаны в таблицу.\n\nХотите добавить ещё одну запись?";
pub const WRITE_FAILED: &str = "❌ Ошибка при записи. Попробуйте позже.";
pub const FINISHED: &str = "👋 Хорошо, ввод завершён.";

pub fn main_keyboard() -> Keyboard {
    Keyboard::Reply {
        buttons: vec![NEW_ENTRY_BUTTON.to_string(), CANCEL_BUTTON.to_string()],
        resize: true
    }
}

pub fn review_keyboard() -> Keyboard {
    Keyboard::Inline(vec![
        InlineButton::new("✅ Записать", Action::Confirm),
        InlineButton::new("❌ Отменить", Action::Cancel)
    ])
}

pub fn continue_keyboard() -> Keyboard {
    Keyboard::Inline(vec![
        InlineButton::new("➕ Да", Action::Again),
        InlineButton::new("❌ Нет", Action::Exit)
    ])
}

pub fn date_error(error: ValidationError) -> &'static str {
    match error {
        ValidationError::Calendar => DATE_CALENDAR_ERROR,
        _ => DATE_FORMAT_ERROR
    }
}

pub fn number_error(error: ValidationError, example: &'static str) -> &'static str {
    match error {
        ValidationError::TooLarge => TOO_LARGE_ERROR,
        ValidationError::OutOfRange => OUT_OF_RANGE_ERROR,
        _ => example
    }
}

fn display_number(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Review text shown before the purchase is written.
pub fn summary(purchase: &Purchase) -> String {
    format!(
        "📋 Проверьте данные:\n\
         Дата: {}\n\
         Продавец: {}\n\
         Описание: {}\n\
         Ед. изм.: {}\n\
         Цена за ед.: {}\n\
         Кол-во: {}\n\
         Сумма: {}\n\
         Примечание: {}\n\n\
         ✅ Всё верно?",
        purchase.date,
        purchase.seller,
        purchase.description,
        purchase.unit,
        display_number(purchase.price),
        display_number(purchase.quantity),
        display_number(purchase.total),
        purchase.note
    )
}
