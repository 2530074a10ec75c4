pub mod checkout_gateway;
