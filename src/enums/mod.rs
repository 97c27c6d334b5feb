pub mod router_kind;
