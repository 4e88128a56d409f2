pub mod dto;
pub mod order_service;

pub use dto::{
    CloseOrderResponse, CreateOrderRequest, CreateOrderResponse, ErrorResponse, OrderListResponse,
    RefundRequest, RefundResponse,
};
pub use order_service::{NotificationOutcome, OrderService};
