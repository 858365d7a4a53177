//! The predefined names and the five basic classes.
//!
//! The basic classes are synthesized as ordinary class declarations and
//! prepended to the program before analysis, so every pass treats them
//! uniformly. There is no need for method bodies; these are built into the
//! runtime system, so every body is the `NoExpr` sentinel. The filename of
//! all basic classes is the literal `<basic class>`.

use coolc_dsl::ast::{Class, Expression, Feature, Formal};
use coolc_dsl::symbol::{Symbol, SymbolTable};

/// The symbols the analyzer refers to by name: the primitive type and
/// method names, as well as fixed names used by the runtime system.
pub struct Predefined {
    pub object: Symbol,
    pub io: Symbol,
    pub int: Symbol,
    pub boolean: Symbol,
    pub string: Symbol,
    pub self_type: Symbol,
    pub main_class: Symbol,
    pub main_method: Symbol,
    pub self_name: Symbol,
    /// `_no_class` cannot be the name of any user-defined class; it is the
    /// parent of `Object` and the root of the inheritance forest.
    pub no_class: Symbol,
    pub no_type: Symbol,
    pub prim_slot: Symbol,
    pub basic_filename: Symbol,

    pub abort: Symbol,
    pub type_name: Symbol,
    pub copy: Symbol,
    pub out_string: Symbol,
    pub out_int: Symbol,
    pub in_string: Symbol,
    pub in_int: Symbol,
    pub length: Symbol,
    pub concat: Symbol,
    pub substr: Symbol,
    pub arg: Symbol,
    pub arg2: Symbol,
    pub val: Symbol,
    pub str_field: Symbol,
}

impl Predefined {
    pub fn intern(symbols: &mut SymbolTable) -> Self {
        Predefined {
            object: symbols.intern("Object"),
            io: symbols.intern("IO"),
            int: symbols.intern("Int"),
            boolean: symbols.intern("Bool"),
            string: symbols.intern("String"),
            self_type: symbols.intern("SELF_TYPE"),
            main_class: symbols.intern("Main"),
            main_method: symbols.intern("main"),
            self_name: symbols.intern("self"),
            no_class: symbols.intern("_no_class"),
            no_type: symbols.intern("_no_type"),
            prim_slot: symbols.intern("_prim_slot"),
            basic_filename: symbols.intern("<basic class>"),
            abort: symbols.intern("abort"),
            type_name: symbols.intern("type_name"),
            copy: symbols.intern("copy"),
            out_string: symbols.intern("out_string"),
            out_int: symbols.intern("out_int"),
            in_string: symbols.intern("in_string"),
            in_int: symbols.intern("in_int"),
            length: symbols.intern("length"),
            concat: symbols.intern("concat"),
            substr: symbols.intern("substr"),
            arg: symbols.intern("arg"),
            arg2: symbols.intern("arg2"),
            val: symbols.intern("_val"),
            str_field: symbols.intern("_str_field"),
        }
    }

    /// True for the three basic value classes whose instances are compared
    /// structurally and which user classes may not inherit from.
    pub fn is_basic_value_class(&self, name: Symbol) -> bool {
        name == self.int || name == self.boolean || name == self.string
    }
}

/// Synthesizes the basic class declarations, in installation order.
pub fn basic_classes(p: &Predefined) -> Vec<Class> {
    let method = |name, formals, return_type| {
        Feature::method(0, name, formals, return_type, Expression::no_expr(0))
    };
    let attr = |name, declared_type| Feature::attribute(0, name, declared_type, Expression::no_expr(0));

    // The Object class has no parent class. Its methods are
    //     abort() : Object        aborts the program
    //     type_name() : String    returns a string representation of class name
    //     copy() : SELF_TYPE      returns a copy of the object
    let object = Class::new(
        0,
        p.object,
        p.no_class,
        p.basic_filename,
        vec![
            method(p.abort, vec![], p.object),
            method(p.type_name, vec![], p.string),
            method(p.copy, vec![], p.self_type),
        ],
    );

    // The IO class inherits from Object. Its methods are
    //     out_string(String) : SELF_TYPE   writes a string to the output
    //     out_int(Int) : SELF_TYPE         writes an int to the output
    //     in_string() : String             reads a string from the input
    //     in_int() : Int                   reads an int from the input
    let io = Class::new(
        0,
        p.io,
        p.object,
        p.basic_filename,
        vec![
            method(
                p.out_string,
                vec![Formal::new(0, p.arg, p.string)],
                p.self_type,
            ),
            method(p.out_int, vec![Formal::new(0, p.arg, p.int)], p.self_type),
            method(p.in_string, vec![], p.string),
            method(p.in_int, vec![], p.int),
        ],
    );

    // Int has no methods and only a single attribute, the value slot.
    let int = Class::new(
        0,
        p.int,
        p.object,
        p.basic_filename,
        vec![attr(p.val, p.prim_slot)],
    );

    // Bool also has only the value slot.
    let boolean = Class::new(
        0,
        p.boolean,
        p.object,
        p.basic_filename,
        vec![attr(p.val, p.prim_slot)],
    );

    // String has a length slot, the string itself, and the string
    // operations:
    //     length() : Int
    //     concat(arg: String) : String
    //     substr(arg: Int, arg2: Int) : String
    let string = Class::new(
        0,
        p.string,
        p.object,
        p.basic_filename,
        vec![
            attr(p.val, p.int),
            attr(p.str_field, p.prim_slot),
            method(p.length, vec![], p.int),
            method(p.concat, vec![Formal::new(0, p.arg, p.string)], p.string),
            method(
                p.substr,
                vec![
                    Formal::new(0, p.arg, p.int),
                    Formal::new(0, p.arg2, p.int),
                ],
                p.string,
            ),
        ],
    );

    vec![object, io, int, boolean, string]
}
