// commune_cart/src/commands.rs

//! Validated inputs for every mutating operation.
//!
//! Request bodies arrive with optional fields; converting them into one of these
//! commands is the only way to reach the stores, so a command value is proof that
//! its fields were present and in range. All checks here run before any storage call.

use crate::error::{CoreError, CoreResult};
use crate::models::OrderLine;
use uuid::Uuid;

/// A cart quantity, always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quantity(i32);

fn check_quantity(raw: Option<i32>) -> Result<i32, String> {
  match raw {
    None => Err("quantity is required".to_string()),
    Some(q) if q < 1 => Err(format!("quantity must be at least 1 (got {})", q)),
    Some(q) => Ok(q),
  }
}

impl Quantity {
  pub fn new(raw: Option<i32>) -> CoreResult<Self> {
    check_quantity(raw).map(Quantity).map_err(CoreError::InvalidInput)
  }

  pub fn get(self) -> i32 {
    self.0
  }
}

fn required_product_id(product_id: Option<Uuid>) -> CoreResult<Uuid> {
  product_id.ok_or_else(|| CoreError::invalid_input("product_id is required"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddToCartCommand {
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: Quantity,
}

impl AddToCartCommand {
  pub fn new(user_id: Uuid, product_id: Option<Uuid>, quantity: Option<i32>) -> CoreResult<Self> {
    Ok(AddToCartCommand {
      user_id,
      product_id: required_product_id(product_id)?,
      quantity: Quantity::new(quantity)?,
    })
  }
}

/// Overwrites the stored quantity of an existing cart row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateQuantityCommand {
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: Quantity,
}

impl UpdateQuantityCommand {
  pub fn new(user_id: Uuid, product_id: Uuid, quantity: Option<i32>) -> CoreResult<Self> {
    Ok(UpdateQuantityCommand {
      user_id,
      product_id,
      quantity: Quantity::new(quantity)?,
    })
  }
}

/// Raw checkout line as submitted by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawOrderLine {
  pub product_id: Option<Uuid>,
  pub quantity: Option<i32>,
  pub price_cents: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrderCommand {
  user_id: Uuid,
  lines: Vec<OrderLine>,
}

impl PlaceOrderCommand {
  pub fn new(user_id: Option<Uuid>, raw_lines: &[RawOrderLine]) -> CoreResult<Self> {
    let user_id = user_id.ok_or_else(|| CoreError::invalid_input("user_id is required"))?;
    if raw_lines.is_empty() {
      return Err(CoreError::invalid_input("cart must contain at least one line"));
    }

    let mut lines = Vec::with_capacity(raw_lines.len());
    for (idx, raw) in raw_lines.iter().enumerate() {
      let product_id = raw
        .product_id
        .ok_or_else(|| CoreError::invalid_input(format!("cart line {}: product_id is required", idx)))?;
      let quantity = check_quantity(raw.quantity)
        .map_err(|m| CoreError::invalid_input(format!("cart line {}: {}", idx, m)))?;
      let price_cents = match raw.price_cents {
        None => return Err(CoreError::invalid_input(format!("cart line {}: price_cents is required", idx))),
        Some(p) if p < 0 => {
          return Err(CoreError::invalid_input(format!(
            "cart line {}: price_cents must not be negative",
            idx
          )))
        }
        Some(p) => p,
      };
      lines.push(OrderLine {
        product_id,
        quantity,
        price_cents,
      });
    }

    Ok(PlaceOrderCommand { user_id, lines })
  }

  pub fn user_id(&self) -> Uuid {
    self.user_id
  }

  /// Never empty.
  pub fn lines(&self) -> &[OrderLine] {
    &self.lines
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quantity_rejects_missing_zero_and_negative() {
    assert!(matches!(Quantity::new(None), Err(CoreError::InvalidInput(_))));
    assert!(matches!(Quantity::new(Some(0)), Err(CoreError::InvalidInput(_))));
    assert!(matches!(Quantity::new(Some(-3)), Err(CoreError::InvalidInput(_))));
    assert_eq!(Quantity::new(Some(4)).unwrap().get(), 4);
  }

  #[test]
  fn add_to_cart_requires_product() {
    let err = AddToCartCommand::new(Uuid::new_v4(), None, Some(1)).unwrap_err();
    assert!(err.to_string().contains("product_id"));
  }

  #[test]
  fn place_order_rejects_empty_cart_and_missing_user() {
    let line = RawOrderLine {
      product_id: Some(Uuid::new_v4()),
      quantity: Some(1),
      price_cents: Some(100),
    };
    assert!(matches!(
      PlaceOrderCommand::new(Some(Uuid::new_v4()), &[]),
      Err(CoreError::InvalidInput(_))
    ));
    assert!(matches!(
      PlaceOrderCommand::new(None, &[line]),
      Err(CoreError::InvalidInput(_))
    ));
  }

  #[test]
  fn place_order_reports_offending_line() {
    let good = RawOrderLine {
      product_id: Some(Uuid::new_v4()),
      quantity: Some(2),
      price_cents: Some(10),
    };
    let bad = RawOrderLine {
      price_cents: Some(-1),
      ..good
    };
    let err = PlaceOrderCommand::new(Some(Uuid::new_v4()), &[good, bad]).unwrap_err();
    assert_eq!(
      err.to_string(),
      "Invalid input: cart line 1: price_cents must not be negative"
    );
  }

  #[test]
  fn place_order_keeps_line_order() {
    let p1 = Uuid::new_v4();
    let p2 = Uuid::new_v4();
    let cmd = PlaceOrderCommand::new(
      Some(Uuid::new_v4()),
      &[
        RawOrderLine {
          product_id: Some(p1),
          quantity: Some(2),
          price_cents: Some(10),
        },
        RawOrderLine {
          product_id: Some(p2),
          quantity: Some(1),
          price_cents: Some(5),
        },
      ],
    )
    .unwrap();
    let ids: Vec<Uuid> = cmd.lines().iter().map(|l| l.product_id).collect();
    assert_eq!(ids, vec![p1, p2]);
  }
}
