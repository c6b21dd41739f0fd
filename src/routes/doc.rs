use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        bills::{BillList, PlaceBillItem, PlaceBillRequest},
        customers::{CreateCustomerRequest, CustomerList, UpdateCustomerRequest},
        products::{
            CountData, CreateProductRequest, ProductList, SetStockRequest, UpdateProductRequest,
        },
        reports::SalesSummary,
    },
    entity::sea_orm_active_enums::BillStatus,
    models::{Bill, BillItem, Customer, CustomerSummary, Money, Product, ProductSnapshot},
    response::{ApiResponse, Meta},
    routes::{bills, customers, health, params, products, reports},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        bills::list_bills,
        bills::place_bill,
        bills::get_bill,
        bills::confirm_bill,
        bills::delete_bill,
        products::list_products,
        products::create_product,
        products::get_product,
        products::get_product_by_barcode,
        products::set_stock,
        products::update_product,
        products::delete_product,
        products::count_products,
        customers::list_customers,
        customers::create_customer,
        customers::get_customer,
        customers::list_customer_bills,
        customers::update_customer,
        customers::delete_customer,
        customers::count_customers,
        reports::sales_summary
    ),
    components(
        schemas(
            Money,
            BillStatus,
            Product,
            ProductSnapshot,
            Customer,
            CustomerSummary,
            Bill,
            BillItem,
            BillList,
            PlaceBillItem,
            PlaceBillRequest,
            CreateProductRequest,
            SetStockRequest,
            UpdateProductRequest,
            CountData,
            ProductList,
            CustomerList,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            SalesSummary,
            params::BillListQuery,
            Meta,
            ApiResponse<Bill>,
            ApiResponse<BillList>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Customer>,
            ApiResponse<CustomerList>,
            ApiResponse<SalesSummary>,
            ApiResponse<CountData>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Bills", description = "Bill placement, confirmation and lookup"),
        (name = "Products", description = "Catalog and stock endpoints"),
        (name = "Customers", description = "Customer endpoints"),
        (name = "Reports", description = "Sales rollups over completed bills"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
