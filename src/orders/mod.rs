//! Order lifecycle: daily numbering, totals, status transitions and the
//! call-waiter cooldown. Pure computation lives here; the route handlers own
//! all persistence.

pub mod lifecycle;
